use serde_json::Value;
use tracing::debug;

use shared_backend::{AppState, BackendClient};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::matches_search;

use crate::models::{Department, DepartmentForm, DepartmentListQuery};

pub struct DepartmentService {
    backend: BackendClient,
}

impl DepartmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_departments(&self, auth_token: &str) -> Result<Vec<Department>, AppError> {
        debug!("Fetching departments");
        Ok(self.backend.list::<Department>(auth_token).await?)
    }

    pub async fn list_departments(
        &self,
        query: &DepartmentListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Department>, AppError> {
        let departments = self.fetch_departments(auth_token).await?;

        Ok(ListResponse::filtered(departments, |d| {
            matches_search(
                query.search.as_deref(),
                &[d.name.as_deref(), d.description.as_deref(), d.head_doctor_name.as_deref()],
            )
        }))
    }

    pub async fn get_department(&self, department_id: i64, auth_token: &str) -> Result<Department, AppError> {
        debug!("Fetching department {}", department_id);
        Ok(self
            .backend
            .get_one::<Department>(&department_id.to_string(), auth_token)
            .await?)
    }

    pub async fn create_department(&self, form: DepartmentForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Add)?;
        debug!("Creating department {}", payload["name"]);
        Ok(self.backend.create::<Department>(payload, auth_token).await?)
    }

    pub async fn update_department(
        &self,
        department_id: i64,
        form: DepartmentForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating department {}", department_id);
        Ok(self
            .backend
            .update::<Department>(&department_id.to_string(), payload, auth_token)
            .await?)
    }

    /// The backend refuses (409) while doctors or staff still reference the
    /// department; its message is passed through unchanged.
    pub async fn delete_department(&self, department_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting department {}", department_id);
        Ok(self
            .backend
            .remove::<Department>(&department_id.to_string(), auth_token)
            .await?)
    }
}
