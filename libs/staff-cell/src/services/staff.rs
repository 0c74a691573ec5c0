use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_backend::{AppState, BackendClient, Resource};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_eq, matches_search};

use crate::models::{RegistrationResponse, Staff, StaffForm, StaffListQuery};

pub struct StaffService {
    backend: BackendClient,
}

impl StaffService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    /// Staff with department details resolved, from `staff/profiles`.
    pub async fn fetch_staff(&self, auth_token: &str) -> Result<Vec<Staff>, AppError> {
        debug!("Fetching staff profiles");
        let path = format!("{}/profiles", Staff::COLLECTION);
        Ok(self.backend.fetch_list::<Staff>(&path, Some(auth_token)).await?)
    }

    pub async fn list_staff(&self, query: &StaffListQuery, auth_token: &str) -> Result<ListResponse<Staff>, AppError> {
        let staff = self.fetch_staff(auth_token).await?;

        Ok(ListResponse::filtered(staff, |s| {
            matches_search(
                query.search.as_deref(),
                &[
                    Some(s.staff_id.as_str()),
                    Some(s.full_name().as_str()),
                    s.email.as_deref(),
                    s.position.as_deref(),
                    s.effective_department_name(),
                ],
            ) && matches_eq(s.effective_department_id().as_ref(), query.department_id.as_ref())
                && matches_eq(Some(&s.admin), query.admin.as_ref())
        }))
    }

    pub async fn get_staff(&self, staff_id: &str, auth_token: &str) -> Result<Staff, AppError> {
        debug!("Fetching staff member {}", staff_id);
        Ok(self.backend.get_one::<Staff>(staff_id, auth_token).await?)
    }

    pub async fn create_staff(&self, form: StaffForm, auth_token: &str) -> Result<RegistrationResponse, AppError> {
        let payload = form.into_checked_payload(FormMode::Add)?;
        let path = format!("{}/create", Staff::COLLECTION);

        let registration: RegistrationResponse = self
            .backend
            .request(Method::POST, &path, Some(auth_token), Some(payload))
            .await?;

        if registration.success == Some(false) {
            return Err(AppError::BadRequest(
                registration
                    .message
                    .unwrap_or_else(|| "Staff registration failed".to_string()),
            ));
        }

        info!("Registered staff member {:?}", registration.role_id);
        Ok(registration)
    }

    pub async fn update_staff(&self, staff_id: &str, form: StaffForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating staff member {}", staff_id);
        Ok(self.backend.update::<Staff>(staff_id, payload, auth_token).await?)
    }

    pub async fn delete_staff(&self, staff_id: &str, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting staff member {}", staff_id);
        Ok(self.backend.remove::<Staff>(staff_id, auth_token).await?)
    }
}
