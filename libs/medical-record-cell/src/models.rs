use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    GeneralCheckup,
    Emergency,
    FollowUp,
    Surgery,
    LabTest,
    Imaging,
    Vaccination,
    Consultation,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::GeneralCheckup => "GENERAL_CHECKUP",
            RecordType::Emergency => "EMERGENCY",
            RecordType::FollowUp => "FOLLOW_UP",
            RecordType::Surgery => "SURGERY",
            RecordType::LabTest => "LAB_TEST",
            RecordType::Imaging => "IMAGING",
            RecordType::Vaccination => "VACCINATION",
            RecordType::Consultation => "CONSULTATION",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub record_id: i64,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub appointment_id: Option<i64>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub appointment_date_time: Option<NaiveDateTime>,
    pub record_type: Option<RecordType>,
    pub diagnosis: Option<String>,
    pub symptoms: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub prescription: Option<String>,
    pub test_results: Option<String>,
    pub medical_history: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub record_date: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub next_appointment: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub updated_at: Option<NaiveDateTime>,
}

impl MedicalRecord {
    pub fn record_day(&self) -> Option<NaiveDate> {
        self.record_date.map(|dt| dt.date())
    }
}

impl Resource for MedicalRecord {
    const COLLECTION: &'static str = "medical-records";
    const LABEL: &'static str = "Medical record";
}

impl TableRow for MedicalRecord {
    fn columns() -> &'static [&'static str] {
        &["ID", "Patient", "Doctor", "Type", "Diagnosis", "Record Date", "Next Appointment"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.record_id.to_string(),
            display::text(self.patient_name.as_deref().or(self.patient_id.as_deref())),
            display::text(self.doctor_name.as_deref().or(self.doctor_id.as_deref())),
            display::value(self.record_type),
            display::text(self.diagnosis.as_deref()),
            display::date(self.record_day()),
            display::date_time(self.next_appointment),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicalRecordListQuery {
    pub search: Option<String>,
    pub patient_id: Option<String>,
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicalRecordForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_id: String,
    pub record_type: String,
    pub diagnosis: String,
    pub symptoms: String,
    pub treatment: String,
    pub notes: String,
    pub prescription: String,
    pub test_results: String,
    pub medical_history: String,
    pub record_date: String,
    pub next_appointment: String,
}

impl ModalForm for MedicalRecordForm {
    type Entity = MedicalRecord;
    const LABEL: &'static str = "Medical Record";

    fn blank() -> Self {
        Self {
            record_type: RecordType::GeneralCheckup.to_string(),
            record_date: forms::form_date(Some(Local::now().date_naive())),
            ..Self::default()
        }
    }

    fn from_entity(record: &MedicalRecord) -> Self {
        Self {
            patient_id: forms::form_text(record.patient_id.as_deref()),
            doctor_id: forms::form_text(record.doctor_id.as_deref()),
            appointment_id: forms::form_number(record.appointment_id),
            record_type: record
                .record_type
                .unwrap_or(RecordType::GeneralCheckup)
                .to_string(),
            diagnosis: forms::form_text(record.diagnosis.as_deref()),
            symptoms: forms::form_text(record.symptoms.as_deref()),
            treatment: forms::form_text(record.treatment.as_deref()),
            notes: forms::form_text(record.notes.as_deref()),
            prescription: forms::form_text(record.prescription.as_deref()),
            test_results: forms::form_text(record.test_results.as_deref()),
            medical_history: forms::form_text(record.medical_history.as_deref()),
            record_date: forms::form_date_of(record.record_date),
            next_appointment: forms::form_date_of(record.next_appointment),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("patientId", &self.patient_id, "Patient")
            .require("doctorId", &self.doctor_id, "Doctor")
            .require("recordType", &self.record_type, "Record type")
            .require("diagnosis", &self.diagnosis, "Diagnosis");

        errors.check(forms::parse_choice_field::<RecordType>("recordType", &self.record_type, "Select a record type"));
        errors.check(forms::parse_number_field::<i64>("appointmentId", &self.appointment_id));
        errors.check(forms::parse_date_field("recordDate", &self.record_date));
        errors.check(forms::parse_date_field("nextAppointment", &self.next_appointment));

        errors.into_vec()
    }

    fn into_payload(self, _mode: FormMode) -> Value {
        let record_type = forms::parse_choice_field::<RecordType>("recordType", &self.record_type, "")
            .ok()
            .flatten()
            .unwrap_or(RecordType::GeneralCheckup);

        json!({
            "patientId": self.patient_id.trim(),
            "doctorId": self.doctor_id.trim(),
            "appointmentId": forms::parse_number_field::<i64>("appointmentId", &self.appointment_id).ok().flatten(),
            "recordType": record_type,
            "diagnosis": self.diagnosis.trim(),
            "symptoms": forms::blank_to_none(&self.symptoms),
            "treatment": forms::blank_to_none(&self.treatment),
            "notes": forms::blank_to_none(&self.notes),
            "prescription": forms::blank_to_none(&self.prescription),
            "testResults": forms::blank_to_none(&self.test_results),
            "medicalHistory": forms::blank_to_none(&self.medical_history),
            "recordDate": forms::start_of_day(&self.record_date),
            "nextAppointment": forms::start_of_day(&self.next_appointment),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_is_a_checkup_today() {
        let form = MedicalRecordForm::blank();
        assert_eq!(form.record_type, "GENERAL_CHECKUP");
        assert_eq!(form.record_date, Local::now().date_naive().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn dates_go_out_as_start_of_day_or_null() {
        let form = MedicalRecordForm {
            patient_id: "PAT-1".into(),
            doctor_id: "DOC-1".into(),
            diagnosis: "Flu".into(),
            record_type: "follow up".into(),
            record_date: "2024-03-01".into(),
            ..MedicalRecordForm::blank()
        };
        assert!(form.validate(FormMode::Add).is_empty());

        let payload = form.into_payload(FormMode::Add);
        assert_eq!(payload["recordDate"], "2024-03-01T00:00:00");
        assert!(payload["nextAppointment"].is_null());
        assert_eq!(payload["recordType"], "FOLLOW_UP");
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let form = MedicalRecordForm {
            patient_id: "PAT-1".into(),
            doctor_id: "DOC-1".into(),
            diagnosis: "Flu".into(),
            record_type: "autopsy".into(),
            ..MedicalRecordForm::blank()
        };
        let errors = form.validate(FormMode::Add);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "recordType");
    }
}
