use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub date_of_birth: Option<NaiveDateTime>,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: Option<i32>,
    pub license_number: Option<String>,
    pub consultation_fee: Option<f64>,
    pub bio: Option<String>,
    pub rating: Option<f64>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        display::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

impl Resource for Doctor {
    const COLLECTION: &'static str = "doctors";
    const LABEL: &'static str = "Doctor";
}

impl TableRow for Doctor {
    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Specialization", "Department", "Email", "Phone", "Experience", "Fee"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.doctor_id.clone(),
            format!("Dr. {}", self.full_name()),
            display::text(self.specialization.as_deref()),
            display::text(self.department_name.as_deref()),
            display::text(self.email.as_deref()),
            display::text(self.phone_number.as_deref()),
            self.experience_years
                .map(|years| format!("{} yrs", years))
                .unwrap_or_else(|| display::MISSING.to_string()),
            display::money(self.consultation_fee),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorListQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub department_id: Option<i64>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DoctorForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
    pub specialization: String,
    pub qualification: String,
    pub experience_years: String,
    pub license_number: String,
    pub consultation_fee: String,
    pub bio: String,
    pub department_id: String,
}

impl ModalForm for DoctorForm {
    type Entity = Doctor;
    const LABEL: &'static str = "Doctor";

    fn blank() -> Self {
        Self::default()
    }

    fn from_entity(doctor: &Doctor) -> Self {
        Self {
            email: forms::form_text(doctor.email.as_deref()),
            password: String::new(),
            first_name: forms::form_text(doctor.first_name.as_deref()),
            last_name: forms::form_text(doctor.last_name.as_deref()),
            phone_number: forms::form_text(doctor.phone_number.as_deref()),
            address: forms::form_text(doctor.address.as_deref()),
            date_of_birth: forms::form_date_of(doctor.date_of_birth),
            gender: forms::form_text(doctor.gender.as_deref()),
            specialization: forms::form_text(doctor.specialization.as_deref()),
            qualification: forms::form_text(doctor.qualification.as_deref()),
            experience_years: forms::form_number(doctor.experience_years),
            license_number: forms::form_text(doctor.license_number.as_deref()),
            consultation_fee: forms::form_number(doctor.consultation_fee),
            bio: forms::form_text(doctor.bio.as_deref()),
            department_id: forms::form_number(doctor.department_id),
        }
    }

    fn validate(&self, mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("email", &self.email, "Email")
            .require("firstName", &self.first_name, "First name")
            .require("lastName", &self.last_name, "Last name")
            .require("specialization", &self.specialization, "Specialization");

        if mode == FormMode::Add {
            errors.require("password", &self.password, "Password");
        }

        errors.check(forms::parse_date_field("dateOfBirth", &self.date_of_birth));

        if let Some(Some(years)) = errors.check(forms::parse_number_field::<i32>("experienceYears", &self.experience_years)) {
            if years < 0 {
                errors.push("experienceYears", "Experience cannot be negative");
            }
        }

        if let Some(Some(fee)) = errors.check(forms::parse_number_field::<f64>("consultationFee", &self.consultation_fee)) {
            if fee < 0.0 {
                errors.push("consultationFee", "Fee cannot be negative");
            }
        }

        errors.check(forms::parse_number_field::<i64>("departmentId", &self.department_id));

        errors.into_vec()
    }

    fn into_payload(self, mode: FormMode) -> Value {
        let mut payload = json!({
            "email": self.email.trim(),
            "firstName": self.first_name.trim(),
            "lastName": self.last_name.trim(),
            "phoneNumber": forms::blank_to_none(&self.phone_number),
            "address": forms::blank_to_none(&self.address),
            "dateOfBirth": forms::iso_date(&self.date_of_birth),
            "gender": forms::blank_to_none(&self.gender.to_uppercase()),
            "specialization": self.specialization.trim(),
            "qualification": forms::blank_to_none(&self.qualification),
            "experienceYears": forms::parse_number_field::<i32>("experienceYears", &self.experience_years).ok().flatten(),
            "licenseNumber": forms::blank_to_none(&self.license_number),
            "consultationFee": forms::parse_number_field::<f64>("consultationFee", &self.consultation_fee).ok().flatten(),
            "bio": forms::blank_to_none(&self.bio),
            "departmentId": forms::parse_number_field::<i64>("departmentId", &self.department_id).ok().flatten(),
        });

        if mode == FormMode::Add || !self.password.trim().is_empty() {
            payload["password"] = json!(self.password);
        }

        payload
    }
}
