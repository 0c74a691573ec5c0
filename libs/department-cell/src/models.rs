use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub head_doctor_id: Option<String>,
    pub head_doctor_name: Option<String>,
}

impl Resource for Department {
    const COLLECTION: &'static str = "departments";
    const LABEL: &'static str = "Department";
}

impl TableRow for Department {
    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Description", "Head Doctor"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.department_id.to_string(),
            display::text(self.name.as_deref()),
            display::text(self.description.as_deref()),
            display::text(self.head_doctor_name.as_deref().or(self.head_doctor_id.as_deref())),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DepartmentForm {
    pub name: String,
    pub description: String,
    pub head_doctor_id: String,
}

impl ModalForm for DepartmentForm {
    type Entity = Department;
    const LABEL: &'static str = "Department";

    fn blank() -> Self {
        Self::default()
    }

    fn from_entity(department: &Department) -> Self {
        Self {
            name: forms::form_text(department.name.as_deref()),
            description: forms::form_text(department.description.as_deref()),
            head_doctor_id: forms::form_text(department.head_doctor_id.as_deref()),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Department name");
        errors.into_vec()
    }

    fn into_payload(self, _mode: FormMode) -> Value {
        json!({
            "name": self.name.trim(),
            "description": forms::blank_to_none(&self.description),
            "headDoctorId": forms::blank_to_none(&self.head_doctor_id),
        })
    }
}
