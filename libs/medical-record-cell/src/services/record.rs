use serde_json::Value;
use tracing::{debug, info};

use shared_backend::{AppState, BackendClient};
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, matches_text, parse_choice, same_day};

use crate::models::{MedicalRecord, MedicalRecordForm, MedicalRecordListQuery, RecordType};

pub struct MedicalRecordService {
    backend: BackendClient,
}

impl MedicalRecordService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_visible(&self, user: &User, auth_token: &str) -> Result<Vec<MedicalRecord>, AppError> {
        let records = match user.role {
            Role::Admin | Role::Staff => {
                debug!("Fetching all medical records");
                self.backend.list::<MedicalRecord>(auth_token).await?
            }
            Role::Doctor => {
                debug!("Fetching medical records written by doctor {}", user.scope_id());
                self.backend
                    .list_scoped::<MedicalRecord>("doctor", user.scope_id(), auth_token)
                    .await?
            }
            Role::Patient => {
                debug!("Fetching medical records of patient {}", user.scope_id());
                self.backend
                    .list_scoped::<MedicalRecord>("patient", user.scope_id(), auth_token)
                    .await?
            }
        };

        Ok(records)
    }

    pub async fn list_records(
        &self,
        user: &User,
        query: &MedicalRecordListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<MedicalRecord>, AppError> {
        let record_type = parse_choice::<RecordType>("record type", query.record_type.as_deref())?;
        let records = self.fetch_visible(user, auth_token).await?;

        Ok(ListResponse::filtered(records, |r| {
            matches_search(
                query.search.as_deref(),
                &[r.diagnosis.as_deref(), r.patient_name.as_deref(), r.doctor_name.as_deref()],
            ) && matches_text(r.patient_id.as_deref(), query.patient_id.as_deref())
                && (record_type.is_none() || r.record_type == record_type)
                && same_day(r.record_day(), query.date)
        }))
    }

    pub async fn get_visible(&self, user: &User, record_id: i64, auth_token: &str) -> Result<MedicalRecord, AppError> {
        debug!("Fetching medical record {}", record_id);
        let record = self
            .backend
            .get_one::<MedicalRecord>(&record_id.to_string(), auth_token)
            .await?;

        let allowed = match user.role {
            Role::Admin | Role::Staff => true,
            Role::Doctor => user.owns(record.doctor_id.as_deref()),
            Role::Patient => user.owns(record.patient_id.as_deref()),
        };

        if !allowed {
            return Err(AppError::Forbidden(
                "You can only access your own medical records".to_string(),
            ));
        }

        Ok(record)
    }

    /// Doctors always write records under their own id.
    pub async fn create_record(&self, user: &User, mut form: MedicalRecordForm, auth_token: &str) -> Result<Value, AppError> {
        if user.role == Role::Doctor {
            form.doctor_id = user.scope_id().to_string();
        }

        let payload = form.into_checked_payload(FormMode::Add)?;
        info!("Creating {} record for patient {}", payload["recordType"], payload["patientId"]);
        Ok(self.backend.create::<MedicalRecord>(payload, auth_token).await?)
    }

    pub async fn update_record(
        &self,
        user: &User,
        record_id: i64,
        mut form: MedicalRecordForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        if user.role == Role::Doctor {
            self.get_visible(user, record_id, auth_token).await?;
            form.doctor_id = user.scope_id().to_string();
        }

        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating medical record {}", record_id);
        Ok(self
            .backend
            .update::<MedicalRecord>(&record_id.to_string(), payload, auth_token)
            .await?)
    }

    pub async fn delete_record(&self, record_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting medical record {}", record_id);
        Ok(self
            .backend
            .remove::<MedicalRecord>(&record_id.to_string(), auth_token)
            .await?)
    }
}
