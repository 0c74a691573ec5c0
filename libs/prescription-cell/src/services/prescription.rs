use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use notification_cell::{NotificationForm, NotificationService, RecipientType};
use shared_backend::{AppState, BackendClient, Resource};
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, parse_choice, same_day};

use crate::models::{Prescription, PrescriptionForm, PrescriptionListQuery, PrescriptionStatus, RefillRequest};

pub struct PrescriptionService {
    backend: BackendClient,
    notifications: NotificationService,
}

impl PrescriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            notifications: NotificationService::new(state),
        }
    }

    pub async fn fetch_visible(&self, user: &User, auth_token: &str) -> Result<Vec<Prescription>, AppError> {
        let prescriptions = match user.role {
            Role::Admin | Role::Staff => {
                debug!("Fetching all prescriptions");
                self.backend.list::<Prescription>(auth_token).await?
            }
            Role::Doctor => {
                debug!("Fetching prescriptions written by doctor {}", user.scope_id());
                self.backend
                    .list_scoped::<Prescription>("doctor", user.scope_id(), auth_token)
                    .await?
            }
            Role::Patient => {
                debug!("Fetching prescriptions of patient {}", user.scope_id());
                self.backend
                    .list_scoped::<Prescription>("patient", user.scope_id(), auth_token)
                    .await?
            }
        };

        Ok(prescriptions)
    }

    pub async fn list_prescriptions(
        &self,
        user: &User,
        query: &PrescriptionListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Prescription>, AppError> {
        let status = parse_choice::<PrescriptionStatus>("status", query.status.as_deref())?;
        let prescriptions = self.fetch_visible(user, auth_token).await?;

        Ok(ListResponse::filtered(prescriptions, |p| {
            let id = p.prescription_id.to_string();
            matches_search(
                query.search.as_deref(),
                &[p.patient_name.as_deref(), p.doctor_name.as_deref(), Some(id.as_str())],
            ) && (status.is_none() || p.status == status)
                && same_day(p.prescription_date, query.date)
        }))
    }

    pub async fn get_visible(&self, user: &User, prescription_id: i64, auth_token: &str) -> Result<Prescription, AppError> {
        debug!("Fetching prescription {}", prescription_id);
        let prescription = self
            .backend
            .get_one::<Prescription>(&prescription_id.to_string(), auth_token)
            .await?;

        let allowed = match user.role {
            Role::Admin | Role::Staff => true,
            Role::Doctor => user.owns(prescription.doctor_id.as_deref()),
            Role::Patient => user.owns(prescription.patient_id.as_deref()),
        };

        if !allowed {
            return Err(AppError::Forbidden(
                "You can only access your own prescriptions".to_string(),
            ));
        }

        Ok(prescription)
    }

    pub async fn create_prescription(
        &self,
        user: &User,
        mut form: PrescriptionForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        if user.role == Role::Doctor {
            form.doctor_id = user.scope_id().to_string();
        }

        let payload = form.into_checked_payload(FormMode::Add)?;
        info!("Creating prescription for patient {}", payload["patientId"]);
        Ok(self.backend.create::<Prescription>(payload, auth_token).await?)
    }

    pub async fn update_prescription(
        &self,
        user: &User,
        prescription_id: i64,
        mut form: PrescriptionForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        if user.role == Role::Doctor {
            self.get_visible(user, prescription_id, auth_token).await?;
            form.doctor_id = user.scope_id().to_string();
        }

        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating prescription {}", prescription_id);
        Ok(self
            .backend
            .update::<Prescription>(&prescription_id.to_string(), payload, auth_token)
            .await?)
    }

    pub async fn change_status(
        &self,
        user: &User,
        prescription_id: i64,
        raw_status: &str,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let status = parse_choice::<PrescriptionStatus>("status", Some(raw_status))?
            .ok_or_else(|| AppError::BadRequest("A concrete status is required".to_string()))?;

        if user.role == Role::Doctor {
            self.get_visible(user, prescription_id, auth_token).await?;
        }

        let path = format!("{}/{}/status/{}", Prescription::COLLECTION, prescription_id, status);
        debug!("Setting prescription {} to {}", prescription_id, status);

        let updated = self.backend.send(Method::PUT, &path, Some(auth_token), None).await?;
        Ok(updated.unwrap_or_default())
    }

    /// Dispenses one refill. Only active prescriptions with refills left qualify.
    pub async fn process_refill(&self, user: &User, prescription_id: i64, auth_token: &str) -> Result<Value, AppError> {
        let prescription = self.get_visible(user, prescription_id, auth_token).await?;

        if !prescription.is_active() || !prescription.can_refill() {
            return Err(AppError::Conflict(format!(
                "Prescription {} has no refills available",
                prescription_id
            )));
        }

        let path = format!("{}/{}/refill", Prescription::COLLECTION, prescription_id);
        info!("Processing refill for prescription {}", prescription_id);

        let refilled = self.backend.send(Method::POST, &path, Some(auth_token), None).await?;
        Ok(refilled.unwrap_or_default())
    }

    /// A patient's refill request reaches the prescribing doctor as a
    /// notification.
    pub async fn request_refill(
        &self,
        user: &User,
        prescription_id: i64,
        request: RefillRequest,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .ok_or_else(|| AppError::invalid_field("reason", "Please give a reason for the refill"))?
            .to_string();

        let prescription = self.get_visible(user, prescription_id, auth_token).await?;
        if !prescription.can_refill() {
            return Err(AppError::Conflict(format!(
                "Prescription {} has no refills available",
                prescription_id
            )));
        }

        let doctor_id = prescription
            .doctor_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Conflict("Prescription has no prescribing doctor".to_string()))?;

        let patient = prescription
            .patient_name
            .as_deref()
            .unwrap_or_else(|| user.scope_id());
        let form = NotificationForm {
            title: "Prescription refill request".to_string(),
            message: format!(
                "{} requests a refill of prescription #{} ({}). Reason: {}",
                patient,
                prescription_id,
                prescription.medication_summary(),
                reason
            ),
            recipient_type: RecipientType::Doctor.to_string(),
            recipient_id: doctor_id,
            priority: "NORMAL".to_string(),
        };

        let sender = user.email.clone().unwrap_or_else(|| user.scope_id().to_string());
        info!("Patient {} requested a refill of prescription {}", user.scope_id(), prescription_id);
        self.notifications.send_notification(form, &sender, auth_token).await
    }

    pub async fn delete_prescription(&self, prescription_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting prescription {}", prescription_id);
        Ok(self
            .backend
            .remove::<Prescription>(&prescription_id.to_string(), auth_token)
            .await?)
    }
}
