use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use appointment_cell::{Appointment, AppointmentStatus};
use medical_record_cell::MedicalRecord;
use medication_cell::Medication;
use payment_cell::PaymentSummary;
use prescription_cell::Prescription;
use shared_models::error::AppError;

pub const DOCTOR_UPCOMING_LIMIT: usize = 5;
pub const PATIENT_PREVIEW_LIMIT: usize = 3;

/// One dashboard tile. A failed fetch leaves `value` empty and carries the
/// error instead of failing the whole page.
#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Section<T> {
    pub fn from_result(label: &str, result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Self { value: Some(value), error: None },
            Err(e) => {
                warn!("Dashboard section {} unavailable: {}", label, e);
                Self {
                    value: None,
                    error: Some(format!("{} unavailable", label)),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCounts {
    pub today: usize,
    pub scheduled: usize,
}

impl AppointmentCounts {
    pub fn from_appointments(appointments: &[Appointment], today: NaiveDate) -> Self {
        Self {
            today: appointments.iter().filter(|a| a.appointment_date == Some(today)).count(),
            scheduled: appointments.iter().filter(|a| a.is_scheduled()).count(),
        }
    }
}

pub fn low_stock_count(medications: &[Medication]) -> usize {
    medications.iter().filter(|m| m.is_low_stock()).count()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub patients: Section<usize>,
    pub doctors: Section<usize>,
    /// Only admins see the staff headcount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<Section<usize>>,
    pub departments: Section<usize>,
    pub appointments: Section<AppointmentCounts>,
    pub low_stock_medications: Section<usize>,
    pub payments: Section<PaymentSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointments {
    pub distinct_patients: usize,
    pub today: usize,
    pub completed: usize,
    pub upcoming: Vec<Appointment>,
}

impl DoctorAppointments {
    pub fn from_appointments(appointments: Vec<Appointment>, now: NaiveDateTime) -> Self {
        let today = now.date();
        let distinct_patients = appointments
            .iter()
            .filter_map(|a| a.patient_id.as_deref())
            .collect::<HashSet<_>>()
            .len();
        let today_count = appointments.iter().filter(|a| a.appointment_date == Some(today)).count();
        let completed = appointments
            .iter()
            .filter(|a| a.status == Some(AppointmentStatus::Completed))
            .count();

        let mut upcoming: Vec<Appointment> = appointments
            .into_iter()
            .filter(|a| a.is_scheduled() && a.starts_at().is_some_and(|start| start >= now))
            .collect();
        upcoming.sort_by_key(Appointment::starts_at);
        upcoming.truncate(DOCTOR_UPCOMING_LIMIT);

        Self {
            distinct_patients,
            today: today_count,
            completed,
            upcoming,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    pub appointments: Section<DoctorAppointments>,
    pub active_prescriptions: Section<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointments {
    pub total: usize,
    pub upcoming: usize,
    pub next: Vec<Appointment>,
}

impl PatientAppointments {
    /// Every scheduled visit counts as upcoming; `next` holds the soonest.
    pub fn from_appointments(appointments: Vec<Appointment>) -> Self {
        let total = appointments.len();
        let mut scheduled: Vec<Appointment> = appointments.into_iter().filter(Appointment::is_scheduled).collect();
        let upcoming = scheduled.len();

        // undated visits sort last
        scheduled.sort_by_key(|a| (a.starts_at().is_none(), a.starts_at()));
        scheduled.truncate(PATIENT_PREVIEW_LIMIT);

        Self {
            total,
            upcoming,
            next: scheduled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPrescriptions {
    pub active: usize,
    pub recent: Vec<Prescription>,
}

impl PatientPrescriptions {
    pub fn from_prescriptions(prescriptions: Vec<Prescription>) -> Self {
        let mut active: Vec<Prescription> = prescriptions.into_iter().filter(Prescription::is_active).collect();
        let count = active.len();

        active.sort_by(|a, b| b.prescription_date.cmp(&a.prescription_date));
        active.truncate(PATIENT_PREVIEW_LIMIT);

        Self {
            active: count,
            recent: active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecords {
    pub recent: Vec<MedicalRecord>,
    pub last_visit: Option<NaiveDate>,
}

impl PatientRecords {
    pub fn from_records(mut records: Vec<MedicalRecord>) -> Self {
        records.sort_by(|a, b| b.record_date.cmp(&a.record_date));
        let last_visit = records.first().and_then(MedicalRecord::record_day);
        records.truncate(PATIENT_PREVIEW_LIMIT);

        Self {
            recent: records,
            last_visit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    pub appointments: Section<PatientAppointments>,
    pub prescriptions: Section<PatientPrescriptions>,
    pub records: Section<PatientRecords>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Admin(AdminDashboard),
    Doctor(DoctorDashboard),
    Patient(PatientDashboard),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn appointment(id: i64, patient: &str, date: &str, time: &str, status: &str) -> Appointment {
        serde_json::from_value(json!({
            "appointmentId": id,
            "patientId": patient,
            "appointmentDate": date,
            "startTime": time,
            "status": status
        }))
        .unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn doctor_upcoming_skips_past_and_caps_at_five() {
        let mut appointments = vec![
            appointment(1, "PAT-1", "2024-03-01", "08:00", "SCHEDULED"),
            appointment(2, "PAT-1", "2024-03-01", "09:00", "COMPLETED"),
            appointment(3, "PAT-2", "2024-03-01", "11:00", "SCHEDULED"),
        ];
        for day in 2..=7 {
            appointments.push(appointment(10 + day, "PAT-3", &format!("2024-03-0{}", day), "10:00", "SCHEDULED"));
        }

        let view = DoctorAppointments::from_appointments(appointments, at("2024-03-01T10:00:00"));
        assert_eq!(view.distinct_patients, 3);
        assert_eq!(view.today, 3);
        assert_eq!(view.completed, 1);

        let ids: Vec<i64> = view.upcoming.iter().map(|a| a.appointment_id).collect();
        assert_eq!(ids, vec![3, 12, 13, 14, 15]);
    }

    #[test]
    fn patient_next_visits_are_soonest_scheduled() {
        let view = PatientAppointments::from_appointments(vec![
            appointment(1, "PAT-1", "2024-05-01", "09:00", "SCHEDULED"),
            appointment(2, "PAT-1", "2024-03-01", "09:00", "CANCELLED"),
            appointment(3, "PAT-1", "2024-04-01", "09:00", "SCHEDULED"),
            appointment(4, "PAT-1", "2024-04-15", "09:00", "SCHEDULED"),
            appointment(5, "PAT-1", "2024-06-01", "09:00", "SCHEDULED"),
        ]);

        assert_eq!(view.total, 5);
        assert_eq!(view.upcoming, 4);
        let ids: Vec<i64> = view.next.iter().map(|a| a.appointment_id).collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }

    #[test]
    fn last_visit_is_latest_record() {
        let records: Vec<MedicalRecord> = ["2024-01-10T00:00:00", "2024-03-02T00:00:00", "2024-02-01T00:00:00"]
            .iter()
            .enumerate()
            .map(|(i, date)| serde_json::from_value(json!({ "recordId": i, "recordDate": date })).unwrap())
            .collect();

        let view = PatientRecords::from_records(records);
        assert_eq!(view.last_visit, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(view.recent[0].record_id, 1);
    }

    #[test]
    fn failed_section_reports_unavailable() {
        let section: Section<usize> = Section::from_result("Patients", Err(AppError::ExternalService("down".into())));
        assert!(!section.is_available());
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({ "value": null, "error": "Patients unavailable" })
        );
    }
}
