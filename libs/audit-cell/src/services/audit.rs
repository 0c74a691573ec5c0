use tracing::debug;

use shared_backend::{AppState, BackendClient};
use shared_models::error::AppError;
use shared_models::listing::ListResponse;
use shared_utils::filter::matches_search;

use crate::models::{AuditLog, AuditLogQuery, LoginHistory, LoginHistoryQuery};

pub struct AuditService {
    backend: BackendClient,
}

impl AuditService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn list_audit_logs(&self, query: &AuditLogQuery, auth_token: &str) -> Result<ListResponse<AuditLog>, AppError> {
        let path = query.backend_path()?;
        debug!("Fetching audit logs from {}", path);
        let entries = self.backend.fetch_list::<AuditLog>(&path, Some(auth_token)).await?;

        Ok(ListResponse::filtered(entries, |entry| {
            matches_search(
                query.search.as_deref(),
                &[
                    entry.username.as_deref(),
                    entry.action.as_deref(),
                    entry.entity_type.as_deref(),
                    entry.details.as_deref(),
                ],
            )
        }))
    }

    pub async fn delete_audit_log(&self, id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting audit log entry {}", id);
        Ok(self.backend.remove::<AuditLog>(&id.to_string(), auth_token).await?)
    }

    pub async fn list_login_history(
        &self,
        query: &LoginHistoryQuery,
        auth_token: &str,
    ) -> Result<ListResponse<LoginHistory>, AppError> {
        let path = query.backend_path()?;
        debug!("Fetching login history from {}", path);
        let entries = self.backend.fetch_list::<LoginHistory>(&path, Some(auth_token)).await?;

        Ok(ListResponse::filtered(entries, |entry| {
            matches_search(
                query.search.as_deref(),
                &[entry.username.as_deref(), entry.ip_address.as_deref()],
            )
        }))
    }

    pub async fn delete_login_history(&self, id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting login history entry {}", id);
        Ok(self.backend.remove::<LoginHistory>(&id.to_string(), auth_token).await?)
    }
}
