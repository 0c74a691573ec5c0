use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown appointment status: {}", raw))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, with = "shared_models::lenient::time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "shared_models::lenient::time")]
    pub end_time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub appointment_fee: Option<f64>,
    pub is_paid: Option<bool>,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == Some(AppointmentStatus::Scheduled)
    }

    /// Start of the appointment, for ordering upcoming visits.
    pub fn starts_at(&self) -> Option<chrono::NaiveDateTime> {
        self.appointment_date
            .map(|date| date.and_time(self.start_time.unwrap_or(NaiveTime::MIN)))
    }
}

impl Resource for Appointment {
    const COLLECTION: &'static str = "appointments";
    const LABEL: &'static str = "Appointment";
}

impl TableRow for Appointment {
    fn columns() -> &'static [&'static str] {
        &["ID", "Patient", "Doctor", "Date", "Time", "Status", "Reason", "Fee", "Paid"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.appointment_id.to_string(),
            display::text(self.patient_name.as_deref().or(self.patient_id.as_deref())),
            display::text(self.doctor_name.as_deref().or(self.doctor_id.as_deref())),
            display::date(self.appointment_date),
            display::time(self.start_time),
            display::value(self.status),
            display::text(self.reason.as_deref()),
            display::money(self.appointment_fee),
            display::flag(self.is_paid),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub reason: String,
    pub notes: String,
    pub department_id: String,
    pub appointment_fee: String,
    pub is_paid: bool,
}

impl ModalForm for AppointmentForm {
    type Entity = Appointment;
    const LABEL: &'static str = "Appointment";

    fn blank() -> Self {
        Self {
            status: AppointmentStatus::Scheduled.to_string(),
            is_paid: false,
            ..Self::default()
        }
    }

    fn from_entity(appointment: &Appointment) -> Self {
        Self {
            patient_id: forms::form_text(appointment.patient_id.as_deref()),
            doctor_id: forms::form_text(appointment.doctor_id.as_deref()),
            appointment_date: forms::form_date(appointment.appointment_date),
            appointment_time: forms::form_time(appointment.start_time),
            status: appointment
                .status
                .unwrap_or(AppointmentStatus::Scheduled)
                .to_string(),
            reason: forms::form_text(appointment.reason.as_deref()),
            notes: forms::form_text(appointment.notes.as_deref()),
            department_id: forms::form_number(appointment.department_id),
            appointment_fee: forms::form_number(appointment.appointment_fee),
            is_paid: appointment.is_paid.unwrap_or(false),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("patientId", &self.patient_id, "Patient")
            .require("doctorId", &self.doctor_id, "Doctor")
            .require("appointmentDate", &self.appointment_date, "Date")
            .require("appointmentTime", &self.appointment_time, "Time");

        errors.check(forms::parse_date_field("appointmentDate", &self.appointment_date));
        errors.check(forms::parse_time_field("appointmentTime", &self.appointment_time));

        if self.status.parse::<AppointmentStatus>().is_err() {
            errors.push("status", "Select a valid status");
        }

        errors.check(forms::parse_number_field::<i64>("departmentId", &self.department_id));

        if let Some(Some(fee)) = errors.check(forms::parse_number_field::<f64>("appointmentFee", &self.appointment_fee)) {
            if fee < 0.0 {
                errors.push("appointmentFee", "Fee cannot be negative");
            }
        }

        errors.into_vec()
    }

    fn into_payload(self, _mode: FormMode) -> Value {
        let time = forms::iso_time(&self.appointment_time);
        let status = self
            .status
            .parse::<AppointmentStatus>()
            .unwrap_or(AppointmentStatus::Scheduled);

        json!({
            "patientId": self.patient_id.trim(),
            "doctorId": self.doctor_id.trim(),
            "appointmentDate": forms::iso_date(&self.appointment_date),
            // one time input; the backend keeps a start and an end
            "startTime": time,
            "endTime": time,
            "status": status,
            "reason": forms::blank_to_none(&self.reason),
            "notes": forms::blank_to_none(&self.notes),
            "departmentId": forms::parse_number_field::<i64>("departmentId", &self.department_id).ok().flatten(),
            "appointmentFee": forms::parse_number_field::<f64>("appointmentFee", &self.appointment_fee).ok().flatten(),
            "isPaid": self.is_paid,
        })
    }
}
