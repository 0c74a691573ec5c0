use serde_json::Value;
use tracing::debug;

use shared_backend::{AppState, BackendClient};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, matches_text};

use crate::models::{Patient, PatientForm, PatientListQuery};

pub struct PatientService {
    backend: BackendClient,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_patients(&self, auth_token: &str) -> Result<Vec<Patient>, AppError> {
        debug!("Fetching patients");
        Ok(self.backend.list::<Patient>(auth_token).await?)
    }

    pub async fn list_patients(
        &self,
        query: &PatientListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Patient>, AppError> {
        let patients = self.fetch_patients(auth_token).await?;

        Ok(ListResponse::filtered(patients, |p| {
            matches_search(
                query.search.as_deref(),
                &[
                    Some(p.patient_id.as_str()),
                    p.first_name.as_deref(),
                    p.last_name.as_deref(),
                    Some(p.full_name().as_str()),
                    p.email.as_deref(),
                    p.phone_number.as_deref(),
                ],
            ) && matches_text(p.gender.as_deref(), query.gender.as_deref())
                && matches_text(p.blood_group.as_deref(), query.blood_group.as_deref())
        }))
    }

    pub async fn get_patient(&self, patient_id: &str, auth_token: &str) -> Result<Patient, AppError> {
        debug!("Fetching patient {}", patient_id);
        Ok(self.backend.get_one::<Patient>(patient_id, auth_token).await?)
    }

    pub async fn create_patient(&self, form: PatientForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Add)?;
        debug!("Registering patient {}", payload["email"]);
        Ok(self.backend.create::<Patient>(payload, auth_token).await?)
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        form: PatientForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating patient {}", patient_id);
        Ok(self.backend.update::<Patient>(patient_id, payload, auth_token).await?)
    }

    pub async fn delete_patient(&self, patient_id: &str, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting patient {}", patient_id);
        Ok(self.backend.remove::<Patient>(patient_id, auth_token).await?)
    }
}
