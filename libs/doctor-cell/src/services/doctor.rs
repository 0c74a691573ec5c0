use serde_json::Value;
use tracing::debug;

use shared_backend::{AppState, BackendClient};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_eq, matches_search, matches_text};

use crate::models::{Doctor, DoctorForm, DoctorListQuery};

pub struct DoctorService {
    backend: BackendClient,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>, AppError> {
        debug!("Fetching doctors");
        Ok(self.backend.list::<Doctor>(auth_token).await?)
    }

    pub async fn list_doctors(
        &self,
        query: &DoctorListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Doctor>, AppError> {
        let doctors = self.fetch_doctors(auth_token).await?;

        Ok(ListResponse::filtered(doctors, |d| {
            matches_search(
                query.search.as_deref(),
                &[
                    Some(d.doctor_id.as_str()),
                    Some(d.full_name().as_str()),
                    d.specialization.as_deref(),
                    d.email.as_deref(),
                    d.department_name.as_deref(),
                ],
            ) && matches_eq(d.department_id.as_ref(), query.department_id.as_ref())
                && matches_text(d.specialization.as_deref(), query.specialization.as_deref())
        }))
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Doctor, AppError> {
        debug!("Fetching doctor {}", doctor_id);
        Ok(self.backend.get_one::<Doctor>(doctor_id, auth_token).await?)
    }

    pub async fn create_doctor(&self, form: DoctorForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Add)?;
        debug!("Registering doctor {}", payload["email"]);
        Ok(self.backend.create::<Doctor>(payload, auth_token).await?)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        form: DoctorForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating doctor {}", doctor_id);
        Ok(self.backend.update::<Doctor>(doctor_id, payload, auth_token).await?)
    }

    pub async fn delete_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting doctor {}", doctor_id);
        Ok(self.backend.remove::<Doctor>(doctor_id, auth_token).await?)
    }
}
