use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

pub const PAYMENT_METHODS: &[&str] = &["CASH", "CREDIT_CARD", "DEBIT_CARD", "INSURANCE", "BANK_TRANSFER", "OTHER"];
pub const PAYMENT_TYPES: &[&str] = &["CONSULTATION", "PROCEDURE", "MEDICATION", "LABORATORY", "IMAGING", "OTHER"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: i64,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub appointment_id: Option<i64>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub appointment_date_time: Option<NaiveDateTime>,
    pub doctor_name: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub payment_type: Option<String>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub payment_date: Option<NaiveDateTime>,
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Payment {
    pub fn payment_day(&self) -> Option<NaiveDate> {
        self.payment_date.map(|dt| dt.date())
    }
}

impl Resource for Payment {
    const COLLECTION: &'static str = "payments";
    const LABEL: &'static str = "Payment";
}

impl TableRow for Payment {
    fn columns() -> &'static [&'static str] {
        &["ID", "Patient", "Appointment", "Amount", "Date", "Method", "Type", "Status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.payment_id.to_string(),
            display::text(self.patient_name.as_deref().or(self.patient_id.as_deref())),
            display::value(self.appointment_id),
            display::money(self.amount),
            display::date(self.payment_day()),
            display::text(self.payment_method.as_deref()),
            display::text(self.payment_type.as_deref()),
            display::value(self.status),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusChange {
    pub status: String,
}

/// An appointment offered in the payment form's drop-down.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentOption {
    pub appointment_id: i64,
    pub patient_id: Option<String>,
    pub label: String,
}

/// Totals shown above the payments table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub by_status: BTreeMap<PaymentStatus, usize>,
    pub completed_revenue: f64,
    pub month_revenue: f64,
}

impl PaymentSummary {
    /// Revenue counts completed payments only; `today` picks the month.
    pub fn from_payments(payments: &[Payment], today: NaiveDate) -> Self {
        let mut by_status = BTreeMap::new();
        let mut completed_revenue = 0.0;
        let mut month_revenue = 0.0;

        for payment in payments {
            if let Some(status) = payment.status {
                *by_status.entry(status).or_insert(0) += 1;
            }

            if payment.status != Some(PaymentStatus::Completed) {
                continue;
            }

            let amount = payment.amount.unwrap_or(0.0);
            completed_revenue += amount;

            if let Some(day) = payment.payment_day() {
                if day.year() == today.year() && day.month() == today.month() {
                    month_revenue += amount;
                }
            }
        }

        Self {
            total_payments: payments.len(),
            by_status,
            completed_revenue,
            month_revenue,
        }
    }

    pub fn count(&self, status: PaymentStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentForm {
    pub appointment_id: String,
    pub amount: String,
    pub payment_date: String,
    pub payment_method: String,
    pub status: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub notes: String,
}

impl PaymentForm {
    pub fn parsed_appointment_id(&self) -> Option<i64> {
        self.appointment_id.trim().parse().ok()
    }
}

impl ModalForm for PaymentForm {
    type Entity = Payment;
    const LABEL: &'static str = "Payment";

    fn blank() -> Self {
        Self {
            payment_date: forms::form_date(Some(Local::now().date_naive())),
            payment_method: "CASH".to_string(),
            status: PaymentStatus::Completed.to_string(),
            payment_type: "CONSULTATION".to_string(),
            ..Self::default()
        }
    }

    fn from_entity(payment: &Payment) -> Self {
        Self {
            appointment_id: forms::form_number(payment.appointment_id),
            amount: forms::form_number(payment.amount),
            payment_date: forms::form_date(payment.payment_day()),
            payment_method: payment.payment_method.clone().unwrap_or_else(|| "CASH".to_string()),
            status: payment
                .status
                .unwrap_or(PaymentStatus::Completed)
                .to_string(),
            payment_type: payment
                .payment_type
                .clone()
                .unwrap_or_else(|| "CONSULTATION".to_string()),
            notes: forms::form_text(payment.notes.as_deref()),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("appointmentId", &self.appointment_id, "Appointment")
            .require("amount", &self.amount, "Amount");

        if let Some(Some(amount)) = errors.check(forms::parse_number_field::<f64>("amount", &self.amount)) {
            if amount <= 0.0 {
                errors.push("amount", "Amount must be greater than zero");
            }
        }

        errors.check(forms::parse_date_field("paymentDate", &self.payment_date));

        if !PAYMENT_METHODS.contains(&self.payment_method.trim()) {
            errors.push("paymentMethod", "Select a payment method");
        }

        if let Some(None) = errors.check(forms::parse_choice_field::<PaymentStatus>("status", &self.status, "Select a valid status")) {
            errors.push("status", "Select a valid status");
        }

        if !self.payment_type.trim().is_empty() && !PAYMENT_TYPES.contains(&self.payment_type.trim()) {
            errors.push("type", "Select a payment type");
        }

        errors.into_vec()
    }

    /// `patientId` is added by the caller from the selected appointment.
    fn into_payload(self, _mode: FormMode) -> Value {
        let payment_type = forms::blank_to_none(&self.payment_type).unwrap_or_else(|| "CONSULTATION".to_string());

        json!({
            "appointmentId": self.parsed_appointment_id(),
            "amount": forms::parse_number_field::<f64>("amount", &self.amount).ok().flatten(),
            "paymentDate": forms::start_of_day(&self.payment_date),
            "paymentMethod": self.payment_method.trim(),
            "status": self.status.trim(),
            "type": payment_type,
            "notes": forms::blank_to_none(&self.notes),
        })
    }
}
