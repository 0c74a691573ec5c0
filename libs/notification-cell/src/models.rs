use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::auth::Role;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

pub const PRIORITIES: &[&str] = &["HIGH", "NORMAL", "LOW"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientType {
    Admin,
    Doctor,
    Patient,
    Staff,
}

impl RecipientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientType::Admin => "ADMIN",
            RecipientType::Doctor => "DOCTOR",
            RecipientType::Patient => "PATIENT",
            RecipientType::Staff => "STAFF",
        }
    }

    /// Inbox a signed-in user reads from.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => RecipientType::Admin,
            Role::Staff => RecipientType::Staff,
            Role::Doctor => RecipientType::Doctor,
            Role::Patient => RecipientType::Patient,
        }
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: Option<String>,
    pub message: Option<String>,
    pub recipient_type: Option<RecipientType>,
    pub recipient_id: Option<String>,
    pub sender_username: Option<String>,
    pub priority: Option<String>,
    pub is_read: Option<bool>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub read_at: Option<NaiveDateTime>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        !self.is_read.unwrap_or(false)
    }
}

impl Resource for Notification {
    const COLLECTION: &'static str = "notifications";
    const LABEL: &'static str = "Notification";
}

impl TableRow for Notification {
    fn columns() -> &'static [&'static str] {
        &["Date", "Recipient", "Recipient ID", "Sender", "Title", "Priority", "Status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            display::date_time(self.created_at),
            display::value(self.recipient_type),
            display::text(self.recipient_id.as_deref()),
            display::text(self.sender_username.as_deref()),
            display::text(self.title.as_deref()),
            display::text(self.priority.as_deref()),
            if self.is_unread() { "Unread" } else { "Read" }.to_string(),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    pub recipient_type: Option<String>,
    pub recipient_id: Option<String>,
    pub sender: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub unread_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationForm {
    pub title: String,
    pub message: String,
    pub recipient_type: String,
    pub recipient_id: String,
    pub priority: String,
}

impl ModalForm for NotificationForm {
    type Entity = Notification;
    const LABEL: &'static str = "Notification";

    fn blank() -> Self {
        Self {
            recipient_type: RecipientType::Staff.to_string(),
            priority: "NORMAL".to_string(),
            ..Self::default()
        }
    }

    fn from_entity(notification: &Notification) -> Self {
        Self {
            title: forms::form_text(notification.title.as_deref()),
            message: forms::form_text(notification.message.as_deref()),
            recipient_type: notification
                .recipient_type
                .unwrap_or(RecipientType::Staff)
                .to_string(),
            recipient_id: forms::form_text(notification.recipient_id.as_deref()),
            priority: notification.priority.clone().unwrap_or_else(|| "NORMAL".to_string()),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("title", &self.title, "Title")
            .require("message", &self.message, "Message")
            .require("recipientType", &self.recipient_type, "Recipient type")
            .require("recipientId", &self.recipient_id, "Recipient ID");

        errors.check(forms::parse_choice_field::<RecipientType>(
            "recipientType",
            &self.recipient_type,
            "Select a recipient type",
        ));

        let priority = self.priority.trim().to_ascii_uppercase();
        if !priority.is_empty() && !PRIORITIES.contains(&priority.as_str()) {
            errors.push("priority", "Select High, Normal or Low");
        }

        errors.into_vec()
    }

    /// Sender and timestamps are filled in when the notification is sent.
    fn into_payload(self, _mode: FormMode) -> Value {
        let priority = forms::blank_to_none(&self.priority.to_ascii_uppercase()).unwrap_or_else(|| "NORMAL".to_string());

        json!({
            "title": self.title.trim(),
            "message": self.message.trim(),
            "recipientType": self.recipient_type.trim().to_ascii_uppercase(),
            "recipientId": self.recipient_id.trim(),
            "priority": priority,
        })
    }
}
