use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    pub department_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub staff_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub date_of_birth: Option<NaiveDateTime>,
    pub gender: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub department: Option<DepartmentRef>,
    pub position: Option<String>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, alias = "isAdmin")]
    pub admin: bool,
}

impl Staff {
    pub fn full_name(&self) -> String {
        display::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    pub fn effective_department_id(&self) -> Option<i64> {
        self.department_id
            .or_else(|| self.department.as_ref().and_then(|d| d.department_id))
    }

    pub fn effective_department_name(&self) -> Option<&str> {
        self.department_name
            .as_deref()
            .or_else(|| self.department.as_ref().and_then(|d| d.name.as_deref()))
    }
}

impl Resource for Staff {
    const COLLECTION: &'static str = "staff";
    const LABEL: &'static str = "Staff member";
}

impl TableRow for Staff {
    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Phone", "Position", "Department", "Hire Date", "Admin"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.staff_id.clone(),
            self.full_name(),
            display::text(self.email.as_deref()),
            display::text(self.phone_number.as_deref()),
            display::text(self.position.as_deref()),
            display::text(self.effective_department_name()),
            display::date(self.hire_date),
            display::flag(Some(self.admin)),
        ]
    }
}

/// Answer of `staff/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub success: Option<bool>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StaffListQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub department_id: Option<i64>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub admin: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
    pub department_id: String,
    pub position: String,
    pub hire_date: String,
    pub is_admin: bool,
}

impl ModalForm for StaffForm {
    type Entity = Staff;
    const LABEL: &'static str = "Staff Member";

    fn blank() -> Self {
        Self {
            hire_date: forms::form_date(Some(Local::now().date_naive())),
            ..Self::default()
        }
    }

    fn from_entity(staff: &Staff) -> Self {
        Self {
            email: forms::form_text(staff.email.as_deref()),
            password: String::new(),
            first_name: forms::form_text(staff.first_name.as_deref()),
            last_name: forms::form_text(staff.last_name.as_deref()),
            phone_number: forms::form_text(staff.phone_number.as_deref()),
            address: forms::form_text(staff.address.as_deref()),
            date_of_birth: forms::form_date_of(staff.date_of_birth),
            gender: forms::form_text(staff.gender.as_deref()),
            department_id: forms::form_number(staff.effective_department_id()),
            position: forms::form_text(staff.position.as_deref()),
            hire_date: forms::form_date(staff.hire_date),
            is_admin: staff.admin,
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
        errors.check(forms::parse_date_field("hireDate", &self.hire_date));
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
            "departmentId": forms::blank_to_none(&self.department_id),
            "position": forms::blank_to_none(&self.position),
            "hireDate": forms::iso_date(&self.hire_date),
            // the backend binds `admin`, older builds read `isAdmin`
            "admin": self.is_admin,
            "isAdmin": self.is_admin,
        });

        if mode == FormMode::Add || !self.password.trim().is_empty() {
            payload["password"] = json!(self.password);
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Staff {
        serde_json::from_value(json!({
            "staffId": "STF-1",
            "firstName": "Pam",
            "lastName": "Beesly",
            "email": "pam@hkare.test",
            "department": { "departmentId": 3, "name": "Reception" },
            "position": "Receptionist",
            "hireDate": "2021-04-01",
            "isAdmin": true
        }))
        .unwrap()
    }

    #[test]
    fn department_falls_back_to_nested_reference() {
        let staff = stored();
        assert_eq!(staff.effective_department_id(), Some(3));
        assert_eq!(staff.effective_department_name(), Some("Reception"));
        assert!(staff.admin);
    }

    #[test]
    fn add_form_defaults_hire_date_to_today() {
        let form = StaffForm::blank();
        assert_eq!(form.hire_date, Local::now().date_naive().format("%Y-%m-%d").to_string());
        assert!(!form.is_admin);
    }

    #[test]
    fn payload_sends_department_as_text_and_both_admin_keys() {
        let payload = StaffForm::from_entity(&stored()).into_payload(FormMode::Edit);
        assert_eq!(payload["departmentId"], "3");
        assert_eq!(payload["hireDate"], "2021-04-01");
        assert_eq!(payload["admin"], true);
        assert_eq!(payload["isAdmin"], true);
        assert!(payload.get("password").is_none());
    }

    #[test]
    fn table_shows_admin_flag() {
        let cells = stored().cells();
        assert_eq!(cells[5], "Reception");
        assert_eq!(cells[6], "Apr 1, 2021");
        assert_eq!(cells[7], "Yes");
    }
}
