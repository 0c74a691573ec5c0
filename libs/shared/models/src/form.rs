use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Add,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// What an opened modal hands to the client: the mode, a title and the
/// local copy of the record's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEnvelope<F> {
    pub mode: FormMode,
    pub title: String,
    pub record_id: Option<String>,
    pub form: F,
}

/// Local form state for one entity's add/edit modal.
///
/// `blank` gives the add-modal defaults and `from_entity` copies a stored
/// record into editable fields. Submission runs `validate` and then converts
/// the fields to the backend's request payload with `into_payload`.
pub trait ModalForm: Sized {
    type Entity;

    /// Noun used in modal titles, e.g. "Patient".
    const LABEL: &'static str;

    fn blank() -> Self;

    fn from_entity(entity: &Self::Entity) -> Self;

    fn validate(&self, mode: FormMode) -> Vec<FieldError>;

    fn into_payload(self, mode: FormMode) -> Value;

    fn open_add() -> FormEnvelope<Self> {
        FormEnvelope {
            mode: FormMode::Add,
            title: format!("Add {}", Self::LABEL),
            record_id: None,
            form: Self::blank(),
        }
    }

    fn open_edit(record_id: &str, entity: &Self::Entity) -> FormEnvelope<Self> {
        FormEnvelope {
            mode: FormMode::Edit,
            title: format!("Edit {}", Self::LABEL),
            record_id: Some(record_id.to_string()),
            form: Self::from_entity(entity),
        }
    }

    fn into_checked_payload(self, mode: FormMode) -> Result<Value, AppError> {
        let errors = self.validate(mode);
        if !errors.is_empty() {
            return Err(AppError::InvalidForm(errors));
        }
        Ok(self.into_payload(mode))
    }
}
