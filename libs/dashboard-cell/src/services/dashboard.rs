use chrono::Local;
use tracing::debug;

use appointment_cell::AppointmentService;
use department_cell::DepartmentService;
use doctor_cell::DoctorService;
use medical_record_cell::MedicalRecordService;
use medication_cell::MedicationService;
use patient_cell::PatientService;
use payment_cell::PaymentService;
use prescription_cell::PrescriptionService;
use shared_backend::AppState;
use shared_models::auth::{Role, User};
use staff_cell::StaffService;

use crate::models::{
    low_stock_count, AdminDashboard, AppointmentCounts, Dashboard, DoctorAppointments, DoctorDashboard,
    PatientAppointments, PatientDashboard, PatientPrescriptions, PatientRecords, Section,
};

/// Builds the landing page for each role. Sections are fetched
/// concurrently and fail independently.
pub struct DashboardService {
    patients: PatientService,
    doctors: DoctorService,
    staff: StaffService,
    departments: DepartmentService,
    appointments: AppointmentService,
    payments: PaymentService,
    medications: MedicationService,
    prescriptions: PrescriptionService,
    records: MedicalRecordService,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            patients: PatientService::new(state),
            doctors: DoctorService::new(state),
            staff: StaffService::new(state),
            departments: DepartmentService::new(state),
            appointments: AppointmentService::new(state),
            payments: PaymentService::new(state),
            medications: MedicationService::new(state),
            prescriptions: PrescriptionService::new(state),
            records: MedicalRecordService::new(state),
        }
    }

    pub async fn dashboard(&self, user: &User, auth_token: &str) -> Dashboard {
        match user.role {
            Role::Admin | Role::Staff => Dashboard::Admin(self.admin_dashboard(user, auth_token).await),
            Role::Doctor => Dashboard::Doctor(self.doctor_dashboard(user, auth_token).await),
            Role::Patient => Dashboard::Patient(self.patient_dashboard(user, auth_token).await),
        }
    }

    pub async fn admin_dashboard(&self, user: &User, auth_token: &str) -> AdminDashboard {
        debug!("Building back office dashboard for user {}", user.id);
        let today = Local::now().date_naive();

        let staff = async {
            if user.is_admin() {
                Some(self.staff.fetch_staff(auth_token).await.map(|s| s.len()))
            } else {
                None
            }
        };

        let (patients, doctors, staff, departments, appointments, medications, payments) = futures::join!(
            self.patients.fetch_patients(auth_token),
            self.doctors.fetch_doctors(auth_token),
            staff,
            self.departments.fetch_departments(auth_token),
            self.appointments.fetch_visible(user, auth_token),
            self.medications.fetch_medications(auth_token),
            self.payments.summary(auth_token)
        );

        AdminDashboard {
            patients: Section::from_result("Patients", patients.map(|p| p.len())),
            doctors: Section::from_result("Doctors", doctors.map(|d| d.len())),
            staff: staff.map(|s| Section::from_result("Staff", s)),
            departments: Section::from_result("Departments", departments.map(|d| d.len())),
            appointments: Section::from_result(
                "Appointments",
                appointments.map(|a| AppointmentCounts::from_appointments(&a, today)),
            ),
            low_stock_medications: Section::from_result("Medications", medications.map(|m| low_stock_count(&m))),
            payments: Section::from_result("Payments", payments),
        }
    }

    pub async fn doctor_dashboard(&self, user: &User, auth_token: &str) -> DoctorDashboard {
        debug!("Building dashboard for doctor {}", user.scope_id());
        let now = Local::now().naive_local();

        let (appointments, prescriptions) = futures::join!(
            self.appointments.fetch_visible(user, auth_token),
            self.prescriptions.fetch_visible(user, auth_token)
        );

        DoctorDashboard {
            appointments: Section::from_result(
                "Appointments",
                appointments.map(|a| DoctorAppointments::from_appointments(a, now)),
            ),
            active_prescriptions: Section::from_result(
                "Prescriptions",
                prescriptions.map(|p| p.iter().filter(|p| p.is_active()).count()),
            ),
        }
    }

    pub async fn patient_dashboard(&self, user: &User, auth_token: &str) -> PatientDashboard {
        debug!("Building dashboard for patient {}", user.scope_id());

        let (appointments, prescriptions, records) = futures::join!(
            self.appointments.fetch_visible(user, auth_token),
            self.prescriptions.fetch_visible(user, auth_token),
            self.records.fetch_visible(user, auth_token)
        );

        PatientDashboard {
            appointments: Section::from_result("Appointments", appointments.map(PatientAppointments::from_appointments)),
            prescriptions: Section::from_result(
                "Prescriptions",
                prescriptions.map(PatientPrescriptions::from_prescriptions),
            ),
            records: Section::from_result("Medical records", records.map(PatientRecords::from_records)),
        }
    }
}
