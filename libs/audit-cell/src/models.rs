use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use shared_backend::{segment, with_query, Resource};
use shared_models::display;
use shared_models::error::AppError;
use shared_models::listing::TableRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub username: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub timestamp: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
}

impl Resource for AuditLog {
    const COLLECTION: &'static str = "audit-logs";
    const LABEL: &'static str = "Audit log entry";
}

impl TableRow for AuditLog {
    fn columns() -> &'static [&'static str] {
        &["Time", "User", "Action", "Entity", "Entity ID", "Details", "IP Address"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            display::date_time(self.timestamp),
            display::text(self.username.as_deref()),
            display::text(self.action.as_deref()),
            display::text(self.entity_type.as_deref()),
            display::text(self.entity_id.as_deref()),
            display::text(self.details.as_deref()),
            display::text(self.ip_address.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistory {
    pub id: i64,
    pub username: Option<String>,
    #[serde(default, with = "shared_models::lenient::date_time")]
    pub login_time: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub login_success: bool,
    pub failure_reason: Option<String>,
}

impl Resource for LoginHistory {
    const COLLECTION: &'static str = "login-history";
    const LABEL: &'static str = "Login history entry";
}

impl TableRow for LoginHistory {
    fn columns() -> &'static [&'static str] {
        &["Time", "User", "Result", "Failure Reason", "IP Address", "User Agent"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            display::date_time(self.login_time),
            display::text(self.username.as_deref()),
            if self.login_success { "Success" } else { "Failed" }.to_string(),
            display::text(self.failure_reason.as_deref()),
            display::text(self.ip_address.as_deref()),
            display::text(self.user_agent.as_deref()),
        ]
    }
}

/// Inclusive day range sent to the backend's `date-range` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<Self>, AppError> {
        match (start, end) {
            (Some(start), Some(end)) if start > end => Err(AppError::BadRequest(
                "Start date must not be after end date".to_string(),
            )),
            (Some(start), Some(end)) => Ok(Some(Self { start, end })),
            _ => Ok(None),
        }
    }

    fn path(&self, collection: &str) -> String {
        let start = format!("{}T00:00:00", self.start.format("%Y-%m-%d"));
        let end = format!("{}T23:59:59", self.end.format("%Y-%m-%d"));
        with_query(&format!("{}/date-range", collection), &[("start", &start), ("end", &end)])
    }
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuditMode {
    #[default]
    All,
    User,
    Entity,
    Action,
    DateRange,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default, deserialize_with = "shared_models::query::choice_or_default")]
    pub mode: AuditMode,
    pub username: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub end: Option<NaiveDate>,
    pub search: Option<String>,
}

impl AuditLogQuery {
    /// Backend listing for the selected mode. A mode without its parameters
    /// lists everything.
    pub fn backend_path(&self) -> Result<String, AppError> {
        let collection = AuditLog::COLLECTION;
        let path = match self.mode {
            AuditMode::All => None,
            AuditMode::User => present(&self.username).map(|user| format!("{}/user/{}", collection, segment(user))),
            AuditMode::Entity => match (present(&self.entity_type), present(&self.entity_id)) {
                (Some(entity_type), Some(entity_id)) => Some(with_query(
                    &format!("{}/entity", collection),
                    &[("entityType", entity_type), ("entityId", entity_id)],
                )),
                _ => None,
            },
            AuditMode::Action => present(&self.action).map(|action| format!("{}/action/{}", collection, segment(action))),
            AuditMode::DateRange => DayRange::new(self.start, self.end)?.map(|range| range.path(collection)),
        };

        Ok(path.unwrap_or_else(|| {
            if self.mode != AuditMode::All {
                debug!("Audit mode {:?} is missing its parameters, listing all", self.mode);
            }
            collection.to_string()
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoginHistoryMode {
    #[default]
    All,
    User,
    Failed,
    DateRange,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginHistoryQuery {
    #[serde(default, deserialize_with = "shared_models::query::choice_or_default")]
    pub mode: LoginHistoryMode,
    pub username: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "shared_models::query::date")]
    pub end: Option<NaiveDate>,
    pub search: Option<String>,
}

impl LoginHistoryQuery {
    pub fn backend_path(&self) -> Result<String, AppError> {
        let collection = LoginHistory::COLLECTION;
        let path = match self.mode {
            LoginHistoryMode::All => None,
            LoginHistoryMode::User => present(&self.username).map(|user| format!("{}/user/{}", collection, segment(user))),
            LoginHistoryMode::Failed => Some(format!("{}/failed", collection)),
            LoginHistoryMode::DateRange => DayRange::new(self.start, self.end)?.map(|range| range.path(collection)),
        };

        Ok(path.unwrap_or_else(|| {
            if self.mode != LoginHistoryMode::All {
                debug!("Login history mode {:?} is missing its parameters, listing all", self.mode);
            }
            collection.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn day(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    #[test]
    fn audit_modes_pick_backend_listing() {
        let by_user = AuditLogQuery {
            mode: AuditMode::User,
            username: Some("admin@hkare.test".into()),
            ..AuditLogQuery::default()
        };
        assert_eq!(by_user.backend_path().unwrap(), "audit-logs/user/admin%40hkare.test");

        let by_entity = AuditLogQuery {
            mode: AuditMode::Entity,
            entity_type: Some("Patient".into()),
            entity_id: Some("PAT-1".into()),
            ..AuditLogQuery::default()
        };
        assert_eq!(by_entity.backend_path().unwrap(), "audit-logs/entity?entityType=Patient&entityId=PAT-1");
    }

    #[test]
    fn missing_parameters_fall_back_to_all() {
        let half_entity = AuditLogQuery {
            mode: AuditMode::Entity,
            entity_type: Some("Patient".into()),
            ..AuditLogQuery::default()
        };
        assert_eq!(half_entity.backend_path().unwrap(), "audit-logs");

        let blank_user = LoginHistoryQuery {
            mode: LoginHistoryMode::User,
            username: Some("  ".into()),
            ..LoginHistoryQuery::default()
        };
        assert_eq!(blank_user.backend_path().unwrap(), "login-history");
    }

    #[test]
    fn date_range_covers_whole_days() {
        let query = LoginHistoryQuery {
            mode: LoginHistoryMode::DateRange,
            start: day("2024-03-01"),
            end: day("2024-03-02"),
            ..LoginHistoryQuery::default()
        };
        assert_eq!(
            query.backend_path().unwrap(),
            "login-history/date-range?start=2024-03-01T00%3A00%3A00&end=2024-03-02T23%3A59%3A59"
        );
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = AuditLogQuery {
            mode: AuditMode::DateRange,
            start: day("2024-03-05"),
            end: day("2024-03-01"),
            ..AuditLogQuery::default()
        };
        assert_matches!(query.backend_path(), Err(AppError::BadRequest(_)));
    }
}
