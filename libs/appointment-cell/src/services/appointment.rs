use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_backend::{AppState, BackendClient, Resource};
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, matches_text, parse_choice, same_day};

use crate::models::{Appointment, AppointmentForm, AppointmentListQuery, AppointmentStatus};

pub struct AppointmentService {
    backend: BackendClient,
}

impl AppointmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    /// Appointments the caller may see: everything for the back office,
    /// the scoped listing for doctors and patients.
    pub async fn fetch_visible(&self, user: &User, auth_token: &str) -> Result<Vec<Appointment>, AppError> {
        let appointments = match user.role {
            Role::Admin | Role::Staff => {
                debug!("Fetching all appointments");
                self.backend.list::<Appointment>(auth_token).await?
            }
            Role::Doctor => {
                debug!("Fetching appointments for doctor {}", user.scope_id());
                self.backend
                    .list_scoped::<Appointment>("doctor", user.scope_id(), auth_token)
                    .await?
            }
            Role::Patient => {
                debug!("Fetching appointments for patient {}", user.scope_id());
                self.backend
                    .list_scoped::<Appointment>("patient", user.scope_id(), auth_token)
                    .await?
            }
        };

        Ok(appointments)
    }

    pub async fn list_appointments(
        &self,
        user: &User,
        query: &AppointmentListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Appointment>, AppError> {
        let status = parse_choice::<AppointmentStatus>("status", query.status.as_deref())?;
        let appointments = self.fetch_visible(user, auth_token).await?;

        Ok(ListResponse::filtered(appointments, |a| {
            let id = a.appointment_id.to_string();
            matches_search(
                query.search.as_deref(),
                &[
                    Some(id.as_str()),
                    a.patient_name.as_deref(),
                    a.patient_id.as_deref(),
                    a.doctor_name.as_deref(),
                    a.doctor_id.as_deref(),
                ],
            ) && (status.is_none() || a.status == status)
                && same_day(a.appointment_date, query.date)
                && matches_text(a.doctor_id.as_deref(), query.doctor_id.as_deref())
                && matches_text(a.patient_id.as_deref(), query.patient_id.as_deref())
        }))
    }

    pub async fn get_appointment(&self, appointment_id: i64, auth_token: &str) -> Result<Appointment, AppError> {
        debug!("Fetching appointment {}", appointment_id);
        Ok(self
            .backend
            .get_one::<Appointment>(&appointment_id.to_string(), auth_token)
            .await?)
    }

    /// Fetches an appointment and checks the caller takes part in it.
    pub async fn get_visible(&self, user: &User, appointment_id: i64, auth_token: &str) -> Result<Appointment, AppError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        let allowed = match user.role {
            Role::Admin | Role::Staff => true,
            Role::Doctor => user.owns(appointment.doctor_id.as_deref()),
            Role::Patient => user.owns(appointment.patient_id.as_deref()),
        };

        if !allowed {
            return Err(AppError::Forbidden(
                "You can only access your own appointments".to_string(),
            ));
        }

        Ok(appointment)
    }

    /// Patients always book for themselves and always as `SCHEDULED`.
    pub async fn create_appointment(
        &self,
        user: &User,
        mut form: AppointmentForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        if user.role == Role::Patient {
            form.patient_id = user.scope_id().to_string();
            form.status = AppointmentStatus::Scheduled.to_string();
            form.is_paid = false;
        }

        let payload = form.into_checked_payload(FormMode::Add)?;
        info!("Booking appointment for patient {} with doctor {}", payload["patientId"], payload["doctorId"]);
        Ok(self.backend.create::<Appointment>(payload, auth_token).await?)
    }

    /// Doctors may only change status and notes; everything else is kept
    /// from the stored appointment.
    pub async fn update_appointment(
        &self,
        user: &User,
        appointment_id: i64,
        form: AppointmentForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let form = if user.role == Role::Doctor {
            let stored = self.get_visible(user, appointment_id, auth_token).await?;
            AppointmentForm {
                status: form.status,
                notes: form.notes,
                ..AppointmentForm::from_entity(&stored)
            }
        } else {
            form
        };

        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating appointment {}", appointment_id);
        Ok(self
            .backend
            .update::<Appointment>(&appointment_id.to_string(), payload, auth_token)
            .await?)
    }

    pub async fn change_status(
        &self,
        user: &User,
        appointment_id: i64,
        raw_status: &str,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let status: AppointmentStatus = raw_status
            .parse()
            .map_err(|_| AppError::invalid_field("status", format!("Unknown status '{}'", raw_status)))?;

        if user.role == Role::Patient && status != AppointmentStatus::Cancelled {
            return Err(AppError::Forbidden(
                "Patients can only cancel appointments".to_string(),
            ));
        }

        if !user.is_back_office() {
            self.get_visible(user, appointment_id, auth_token).await?;
        }

        let path = format!("{}/{}/status", Appointment::COLLECTION, appointment_id);
        debug!("Setting appointment {} to {}", appointment_id, status);

        let updated = self
            .backend
            .send(Method::PATCH, &path, Some(auth_token), Some(json!({ "status": status })))
            .await?;

        Ok(updated.unwrap_or_default())
    }

    pub async fn delete_appointment(&self, appointment_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting appointment {}", appointment_id);
        Ok(self
            .backend
            .remove::<Appointment>(&appointment_id.to_string(), auth_token)
            .await?)
    }
}
