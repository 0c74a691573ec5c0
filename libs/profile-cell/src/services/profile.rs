use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use doctor_cell::{DoctorForm, DoctorService};
use patient_cell::{PatientForm, PatientService};
use shared_backend::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::form::{FormEnvelope, ModalForm};
use staff_cell::{StaffForm, StaffService};

use crate::models::{Profile, ProfileForm};

pub struct ProfileService {
    doctors: DoctorService,
    patients: PatientService,
    staff: StaffService,
}

fn read_form<F: DeserializeOwned>(body: Value) -> Result<F, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("Malformed profile form: {}", e)))
}

fn wrap<F, T>(envelope: FormEnvelope<F>, into: impl FnOnce(F) -> T) -> FormEnvelope<T> {
    FormEnvelope {
        mode: envelope.mode,
        title: envelope.title,
        record_id: envelope.record_id,
        form: into(envelope.form),
    }
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: DoctorService::new(state),
            patients: PatientService::new(state),
            staff: StaffService::new(state),
        }
    }

    pub async fn get_profile(&self, user: &User, auth_token: &str) -> Result<Profile, AppError> {
        let id = user.scope_id();
        debug!("Resolving {} profile {}", user.role.as_str(), id);

        let profile = match user.role {
            Role::Doctor => Profile::Doctor(self.doctors.get_doctor(id, auth_token).await?),
            Role::Patient => Profile::Patient(self.patients.get_patient(id, auth_token).await?),
            Role::Admin | Role::Staff => Profile::Staff(self.staff.get_staff(id, auth_token).await?),
        };

        Ok(profile)
    }

    pub async fn open_form(&self, user: &User, auth_token: &str) -> Result<FormEnvelope<ProfileForm>, AppError> {
        let envelope = match self.get_profile(user, auth_token).await? {
            Profile::Doctor(doctor) => wrap(DoctorForm::open_edit(&doctor.doctor_id, &doctor), ProfileForm::Doctor),
            Profile::Patient(patient) => wrap(PatientForm::open_edit(&patient.patient_id, &patient), ProfileForm::Patient),
            Profile::Staff(staff) => wrap(StaffForm::open_edit(&staff.staff_id, &staff), ProfileForm::Staff),
        };

        Ok(envelope)
    }

    /// Saves the caller's own record. Staff cannot change their own admin
    /// flag from here.
    pub async fn update_profile(&self, user: &User, body: Value, auth_token: &str) -> Result<Value, AppError> {
        let id = user.scope_id();
        info!("Updating own {} profile {}", user.role.as_str(), id);

        match user.role {
            Role::Doctor => self.doctors.update_doctor(id, read_form(body)?, auth_token).await,
            Role::Patient => self.patients.update_patient(id, read_form(body)?, auth_token).await,
            Role::Admin | Role::Staff => {
                let stored = self.staff.get_staff(id, auth_token).await?;
                let form: StaffForm = read_form(body)?;
                let form = StaffForm {
                    is_admin: stored.admin,
                    ..form
                };
                self.staff.update_staff(id, form, auth_token).await
            }
        }
    }
}
