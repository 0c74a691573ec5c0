use serde::Serialize;

use doctor_cell::{Doctor, DoctorForm};
use patient_cell::{Patient, PatientForm};
use staff_cell::{Staff, StaffForm};

/// The signed-in user's own record. Admins and staff share the staff
/// directory.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Profile {
    Doctor(Doctor),
    Patient(Patient),
    Staff(Staff),
}

impl Profile {
    pub fn record_id(&self) -> &str {
        match self {
            Profile::Doctor(doctor) => &doctor.doctor_id,
            Profile::Patient(patient) => &patient.patient_id,
            Profile::Staff(staff) => &staff.staff_id,
        }
    }
}

/// Edit-form state for whichever record the profile resolved to.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileForm {
    Doctor(DoctorForm),
    Patient(PatientForm),
    Staff(StaffForm),
}
