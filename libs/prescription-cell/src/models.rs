use std::fmt;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

/// Days a prescription stays valid when no expiry is entered.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    Active,
    Completed,
    Expired,
    Cancelled,
}

impl PrescriptionStatus {
    pub const ALL: [PrescriptionStatus; 4] = [
        PrescriptionStatus::Active,
        PrescriptionStatus::Completed,
        PrescriptionStatus::Expired,
        PrescriptionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Active => "ACTIVE",
            PrescriptionStatus::Completed => "COMPLETED",
            PrescriptionStatus::Expired => "EXPIRED",
            PrescriptionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLine {
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub instructions: Option<String>,
    pub quantity: Option<i32>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescription_id: i64,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub medical_record_id: Option<i64>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub prescription_date: Option<NaiveDate>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub expiry_date: Option<NaiveDate>,
    pub status: Option<PrescriptionStatus>,
    pub notes: Option<String>,
    pub is_refillable: Option<bool>,
    pub refills_remaining: Option<i32>,
    pub total_refills: Option<i32>,
    #[serde(default)]
    pub medications: Vec<MedicationLine>,
    pub pharmacy_id: Option<i64>,
    pub pharmacy_name: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Prescription {
    pub fn is_active(&self) -> bool {
        self.status == Some(PrescriptionStatus::Active)
    }

    pub fn can_refill(&self) -> bool {
        self.is_refillable.unwrap_or(false) && self.refills_remaining.unwrap_or(0) > 0
    }

    /// Names of the prescribed medications, comma separated.
    pub fn medication_summary(&self) -> String {
        let names: Vec<&str> = self
            .medications
            .iter()
            .filter_map(|line| line.medication_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            display::MISSING.to_string()
        } else {
            names.join(", ")
        }
    }
}

impl Resource for Prescription {
    const COLLECTION: &'static str = "prescriptions";
    const LABEL: &'static str = "Prescription";
}

impl TableRow for Prescription {
    fn columns() -> &'static [&'static str] {
        &["ID", "Patient", "Doctor", "Medications", "Date", "Expires", "Status", "Refills"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.prescription_id.to_string(),
            display::text(self.patient_name.as_deref().or(self.patient_id.as_deref())),
            display::text(self.doctor_name.as_deref().or(self.doctor_id.as_deref())),
            self.medication_summary(),
            display::date(self.prescription_date),
            display::date(self.expiry_date),
            display::value(self.status),
            if self.is_refillable.unwrap_or(false) {
                format!("{} of {}", self.refills_remaining.unwrap_or(0), self.total_refills.unwrap_or(0))
            } else {
                "Not refillable".to_string()
            },
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PrescriptionListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefillRequest {
    pub reason: Option<String>,
}

/// One editable medication row of the prescription modal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationLineForm {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: String,
    pub quantity: String,
    pub duration: String,
}

impl MedicationLineForm {
    fn starter() -> Self {
        Self {
            quantity: "1".to_string(),
            ..Self::default()
        }
    }

    fn is_blank(&self) -> bool {
        self.medication_name.trim().is_empty()
    }

    fn to_payload(&self) -> Value {
        json!({
            "medicationName": self.medication_name.trim(),
            "dosage": forms::blank_to_none(&self.dosage),
            "frequency": forms::blank_to_none(&self.frequency),
            "instructions": forms::blank_to_none(&self.instructions),
            "quantity": forms::parse_number_field::<i32>("quantity", &self.quantity).ok().flatten().unwrap_or(1),
            "duration": forms::blank_to_none(&self.duration),
        })
    }
}

impl From<&MedicationLine> for MedicationLineForm {
    fn from(line: &MedicationLine) -> Self {
        Self {
            medication_name: forms::form_text(line.medication_name.as_deref()),
            dosage: forms::form_text(line.dosage.as_deref()),
            frequency: forms::form_text(line.frequency.as_deref()),
            instructions: forms::form_text(line.instructions.as_deref()),
            quantity: forms::form_number(line.quantity),
            duration: forms::form_text(line.duration.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrescriptionForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub medical_record_id: String,
    pub prescription_date: String,
    pub expiry_date: String,
    pub status: String,
    pub notes: String,
    pub is_refillable: bool,
    pub total_refills: String,
    pub medications: Vec<MedicationLineForm>,
}

impl PrescriptionForm {
    /// Lines with a medication name; the rest are dropped on submit.
    pub fn named_lines(&self) -> impl Iterator<Item = (usize, &MedicationLineForm)> {
        self.medications.iter().enumerate().filter(|(_, line)| !line.is_blank())
    }

    fn resolved_expiry(&self, mode: FormMode) -> Option<String> {
        if let Some(expiry) = forms::iso_date(&self.expiry_date) {
            return Some(expiry);
        }
        if mode == FormMode::Edit {
            return None;
        }
        default_expiry(&self.prescription_date).map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Prescription date plus the default validity; today when no date is given.
pub fn default_expiry(prescription_date: &str) -> Option<NaiveDate> {
    let start = if prescription_date.trim().is_empty() {
        Some(Local::now().date_naive())
    } else {
        shared_models::lenient::parse_date(prescription_date)
    };
    start.map(|d| d + Duration::days(DEFAULT_VALIDITY_DAYS))
}

impl ModalForm for PrescriptionForm {
    type Entity = Prescription;
    const LABEL: &'static str = "Prescription";

    fn blank() -> Self {
        Self {
            prescription_date: forms::form_date(Some(Local::now().date_naive())),
            status: PrescriptionStatus::Active.to_string(),
            total_refills: "0".to_string(),
            medications: vec![MedicationLineForm::starter()],
            ..Self::default()
        }
    }

    fn from_entity(prescription: &Prescription) -> Self {
        let mut medications: Vec<MedicationLineForm> =
            prescription.medications.iter().map(MedicationLineForm::from).collect();
        if medications.is_empty() {
            medications.push(MedicationLineForm::starter());
        }

        Self {
            patient_id: forms::form_text(prescription.patient_id.as_deref()),
            doctor_id: forms::form_text(prescription.doctor_id.as_deref()),
            medical_record_id: forms::form_number(prescription.medical_record_id),
            prescription_date: forms::form_date(prescription.prescription_date),
            expiry_date: forms::form_date(prescription.expiry_date),
            status: prescription
                .status
                .unwrap_or(PrescriptionStatus::Active)
                .to_string(),
            notes: forms::form_text(prescription.notes.as_deref()),
            is_refillable: prescription.is_refillable.unwrap_or(false),
            total_refills: forms::form_number(prescription.total_refills.or(Some(0))),
            medications,
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("patientId", &self.patient_id, "Patient")
            .require("doctorId", &self.doctor_id, "Doctor");

        let prescribed = errors.check(forms::parse_date_field("prescriptionDate", &self.prescription_date));
        let expires = errors.check(forms::parse_date_field("expiryDate", &self.expiry_date));
        if let (Some(Some(prescribed)), Some(Some(expires))) = (prescribed, expires) {
            if expires < prescribed {
                errors.push("expiryDate", "Expiry date cannot be before the prescription date");
            }
        }

        errors.check(forms::parse_choice_field::<PrescriptionStatus>("status", &self.status, "Select a valid status"));
        errors.check(forms::parse_number_field::<i64>("medicalRecordId", &self.medical_record_id));

        if let Some(Some(refills)) = errors.check(forms::parse_number_field::<i32>("totalRefills", &self.total_refills)) {
            if refills < 0 {
                errors.push("totalRefills", "Refills cannot be negative");
            }
        }

        let mut named = 0;
        for (index, line) in self.named_lines() {
            named += 1;
            match forms::parse_number_field::<i32>("quantity", &line.quantity) {
                Ok(Some(quantity)) if quantity < 1 => {
                    errors.push(&format!("medications[{}].quantity", index), "Quantity must be at least 1")
                }
                Err(_) => errors.push(&format!("medications[{}].quantity", index), "Enter a valid number"),
                _ => {}
            }
        }
        if named == 0 {
            errors.push("medications", "Add at least one medication");
        }

        errors.into_vec()
    }

    fn into_payload(self, mode: FormMode) -> Value {
        let status = forms::parse_choice_field::<PrescriptionStatus>("status", &self.status, "")
            .ok()
            .flatten()
            .unwrap_or(PrescriptionStatus::Active);
        let total_refills = if self.is_refillable {
            forms::parse_number_field::<i32>("totalRefills", &self.total_refills).ok().flatten().unwrap_or(0)
        } else {
            0
        };
        let medications: Vec<Value> = self.named_lines().map(|(_, line)| line.to_payload()).collect();

        json!({
            "patientId": self.patient_id.trim(),
            "doctorId": self.doctor_id.trim(),
            "medicalRecordId": forms::parse_number_field::<i64>("medicalRecordId", &self.medical_record_id).ok().flatten(),
            "prescriptionDate": forms::iso_date(&self.prescription_date),
            "expiryDate": self.resolved_expiry(mode),
            "status": status,
            "notes": forms::blank_to_none(&self.notes),
            "isRefillable": self.is_refillable,
            "totalRefills": total_refills,
            "medications": medications,
        })
    }
}
