use chrono::Local;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use appointment_cell::Appointment;
use shared_backend::{AppState, BackendClient, Resource};
use shared_models::display;
use shared_models::error::AppError;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_search, parse_choice, same_day};

use crate::models::{AppointmentOption, Payment, PaymentForm, PaymentListQuery, PaymentStatus, PaymentSummary};

pub struct PaymentService {
    backend: BackendClient,
}

impl PaymentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_payments(&self, auth_token: &str) -> Result<Vec<Payment>, AppError> {
        debug!("Fetching payments");
        Ok(self.backend.list::<Payment>(auth_token).await?)
    }

    pub async fn list_payments(&self, query: &PaymentListQuery, auth_token: &str) -> Result<ListResponse<Payment>, AppError> {
        let status = parse_choice::<PaymentStatus>("status", query.status.as_deref())?;
        let payments = self.fetch_payments(auth_token).await?;

        Ok(ListResponse::filtered(payments, |p| {
            let appointment_id = p.appointment_id.map(|id| id.to_string());
            matches_search(
                query.search.as_deref(),
                &[
                    p.patient_name.as_deref(),
                    appointment_id.as_deref(),
                    p.transaction_id.as_deref(),
                ],
            ) && (status.is_none() || p.status == status)
                && same_day(p.payment_day(), query.date)
        }))
    }

    pub async fn summary(&self, auth_token: &str) -> Result<PaymentSummary, AppError> {
        let payments = self.fetch_payments(auth_token).await?;
        Ok(PaymentSummary::from_payments(&payments, Local::now().date_naive()))
    }

    pub async fn get_payment(&self, payment_id: i64, auth_token: &str) -> Result<Payment, AppError> {
        debug!("Fetching payment {}", payment_id);
        Ok(self.backend.get_one::<Payment>(&payment_id.to_string(), auth_token).await?)
    }

    pub async fn appointment_options(&self, auth_token: &str) -> Result<Vec<AppointmentOption>, AppError> {
        let appointments = self.backend.list::<Appointment>(auth_token).await?;

        Ok(appointments
            .into_iter()
            .map(|a| AppointmentOption {
                appointment_id: a.appointment_id,
                patient_id: a.patient_id.clone(),
                label: format!(
                    "{} - {}",
                    display::date(a.appointment_date),
                    a.reason.as_deref().unwrap_or("No reason provided")
                ),
            })
            .collect())
    }

    /// Validates the form, resolves its appointment from the appointment
    /// list and builds the payload with that appointment's patient.
    async fn resolve_payload(&self, form: PaymentForm, mode: FormMode, auth_token: &str) -> Result<Value, AppError> {
        let mut errors = form.validate(mode);

        let appointment = match form.parsed_appointment_id() {
            Some(id) => self
                .backend
                .list::<Appointment>(auth_token)
                .await?
                .into_iter()
                .find(|a| a.appointment_id == id),
            None => None,
        };

        let patient_id = match appointment {
            Some(appointment) => appointment.patient_id,
            None => {
                errors.retain(|e| e.field != "appointmentId");
                errors.insert(0, FieldError::new("appointmentId", "Please select a valid appointment"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(AppError::InvalidForm(errors));
        }

        let mut payload = form.into_payload(mode);
        payload["patientId"] = json!(patient_id);
        Ok(payload)
    }

    pub async fn create_payment(&self, form: PaymentForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = self.resolve_payload(form, FormMode::Add, auth_token).await?;
        info!("Recording payment for appointment {}", payload["appointmentId"]);
        Ok(self.backend.create::<Payment>(payload, auth_token).await?)
    }

    pub async fn update_payment(&self, payment_id: i64, form: PaymentForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = self.resolve_payload(form, FormMode::Edit, auth_token).await?;
        debug!("Updating payment {}", payment_id);
        Ok(self
            .backend
            .update::<Payment>(&payment_id.to_string(), payload, auth_token)
            .await?)
    }

    pub async fn change_status(&self, payment_id: i64, raw_status: &str, auth_token: &str) -> Result<Value, AppError> {
        let status = parse_choice::<PaymentStatus>("status", Some(raw_status))?
            .ok_or_else(|| AppError::BadRequest("A payment status is required".to_string()))?;

        let path = format!("{}/{}/status", Payment::COLLECTION, payment_id);
        debug!("Setting payment {} to {}", payment_id, status);

        let updated = self
            .backend
            .send(Method::PATCH, &path, Some(auth_token), Some(json!({ "status": status })))
            .await?;

        Ok(updated.unwrap_or_default())
    }

    pub async fn delete_payment(&self, payment_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting payment {}", payment_id);
        Ok(self.backend.remove::<Payment>(&payment_id.to_string(), auth_token).await?)
    }
}
