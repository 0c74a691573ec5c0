use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

pub const GENDERS: &[&str] = &["MALE", "FEMALE", "OTHER"];
pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub doctor_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
}

impl DoctorSummary {
    pub fn full_name(&self) -> String {
        display::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub date_of_birth: Option<NaiveDateTime>,
    pub blood_group: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub allergies: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub primary_doctor: Option<DoctorSummary>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        display::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

impl Resource for Patient {
    const COLLECTION: &'static str = "patients";
    const LABEL: &'static str = "Patient";
}

impl TableRow for Patient {
    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Phone", "Gender", "Date of Birth", "Blood Group", "Primary Doctor"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.patient_id.clone(),
            self.full_name(),
            display::text(self.email.as_deref()),
            display::text(self.phone_number.as_deref()),
            display::text(self.gender.as_deref()),
            display::date(self.date_of_birth.map(|d| d.date())),
            display::text(self.blood_group.as_deref()),
            self.primary_doctor
                .as_ref()
                .map(DoctorSummary::full_name)
                .unwrap_or_else(|| display::MISSING.to_string()),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientListQuery {
    pub search: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
    pub blood_group: String,
    pub height: String,
    pub weight: String,
    pub allergies: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub insurance_provider: String,
    pub insurance_id: String,
    pub primary_doctor_id: String,
}

impl ModalForm for PatientForm {
    type Entity = Patient;
    const LABEL: &'static str = "Patient";

    fn blank() -> Self {
        Self::default()
    }

    fn from_entity(patient: &Patient) -> Self {
        Self {
            email: forms::form_text(patient.email.as_deref()),
            password: String::new(),
            first_name: forms::form_text(patient.first_name.as_deref()),
            last_name: forms::form_text(patient.last_name.as_deref()),
            phone_number: forms::form_text(patient.phone_number.as_deref()),
            address: forms::form_text(patient.address.as_deref()),
            date_of_birth: forms::form_date_of(patient.date_of_birth),
            gender: forms::form_text(patient.gender.as_deref()),
            blood_group: forms::form_text(patient.blood_group.as_deref()),
            height: forms::form_number(patient.height),
            weight: forms::form_number(patient.weight),
            allergies: forms::form_text(patient.allergies.as_deref()),
            emergency_contact_name: forms::form_text(patient.emergency_contact_name.as_deref()),
            emergency_contact_phone: forms::form_text(patient.emergency_contact_phone.as_deref()),
            insurance_provider: forms::form_text(patient.insurance_provider.as_deref()),
            insurance_id: forms::form_text(patient.insurance_id.as_deref()),
            primary_doctor_id: patient
                .primary_doctor
                .as_ref()
                .and_then(|d| d.doctor_id.clone())
                .unwrap_or_default(),
        }
    }

    fn validate(&self, mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("email", &self.email, "Email")
            .require("firstName", &self.first_name, "First name")
            .require("lastName", &self.last_name, "Last name");

        if mode == FormMode::Add {
            errors.require("password", &self.password, "Password");
        }

        errors.check(forms::parse_date_field("dateOfBirth", &self.date_of_birth));

        for (field, raw) in [("height", &self.height), ("weight", &self.weight)] {
            if let Some(Some(value)) = errors.check(forms::parse_number_field::<f64>(field, raw)) {
                if value <= 0.0 {
                    errors.push(field, "Must be greater than zero");
                }
            }
        }

        let gender = self.gender.trim().to_uppercase();
        if !gender.is_empty() && !GENDERS.contains(&gender.as_str()) {
            errors.push("gender", "Choose Male, Female or Other");
        }

        let blood_group = self.blood_group.trim().to_uppercase();
        if !blood_group.is_empty() && !BLOOD_GROUPS.contains(&blood_group.as_str()) {
            errors.push("bloodGroup", "Unknown blood group");
        }

        errors.into_vec()
    }

    fn into_payload(self, mode: FormMode) -> Value {
        let mut payload = json!({
            "email": self.email.trim(),
            "firstName": self.first_name.trim(),
            "lastName": self.last_name.trim(),
            "phoneNumber": forms::blank_to_none(&self.phone_number),
            "address": forms::blank_to_none(&self.address),
            "dateOfBirth": forms::start_of_day(&self.date_of_birth),
            "gender": forms::blank_to_none(&self.gender.to_uppercase()),
            "bloodGroup": forms::blank_to_none(&self.blood_group.to_uppercase()),
            "height": forms::parse_number_field::<f64>("height", &self.height).ok().flatten(),
            "weight": forms::parse_number_field::<f64>("weight", &self.weight).ok().flatten(),
            "allergies": forms::blank_to_none(&self.allergies),
            "emergencyContactName": forms::blank_to_none(&self.emergency_contact_name),
            "emergencyContactPhone": forms::blank_to_none(&self.emergency_contact_phone),
            "insuranceProvider": forms::blank_to_none(&self.insurance_provider),
            "insuranceId": forms::blank_to_none(&self.insurance_id),
            "primaryDoctorId": forms::blank_to_none(&self.primary_doctor_id),
        });

        if mode == FormMode::Add || !self.password.trim().is_empty() {
            payload["password"] = json!(self.password);
        }

        payload
    }
}
