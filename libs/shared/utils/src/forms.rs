//! Conversions between stored values and modal form fields.
//!
//! Form fields are kept as text the way the inputs hold them; numbers and
//! dates are only parsed when the form is submitted.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde_json::Value;

use shared_models::form::FieldError;
use shared_models::lenient;

/// `YYYY-MM-DD` for a date input; empty when there is no usable date.
pub fn form_date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

pub fn form_date_of(value: Option<NaiveDateTime>) -> String {
    form_date(value.map(|dt| dt.date()))
}

pub fn form_time(value: Option<NaiveTime>) -> String {
    value.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}

pub fn form_number<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn form_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn required(field: &str, raw: &str, label: &str) -> Option<FieldError> {
    if raw.trim().is_empty() {
        Some(FieldError::new(field, format!("{} is required", label)))
    } else {
        None
    }
}

pub fn parse_date_field(field: &str, raw: &str) -> Result<Option<NaiveDate>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    lenient::parse_date(raw)
        .map(Some)
        .ok_or_else(|| FieldError::new(field, "Enter a valid date (YYYY-MM-DD)"))
}

pub fn parse_time_field(field: &str, raw: &str) -> Result<Option<NaiveTime>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    lenient::parse_time(raw)
        .map(Some)
        .ok_or_else(|| FieldError::new(field, "Enter a valid time (HH:MM)"))
}

pub fn parse_number_field<T: FromStr>(field: &str, raw: &str) -> Result<Option<T>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| FieldError::new(field, "Enter a valid number"))
}

/// A drop-down value read as the backend's enum (`"follow up"` reads as
/// `FOLLOW_UP`). Blank is `None`.
pub fn parse_choice_field<E: DeserializeOwned>(field: &str, raw: &str, message: &str) -> Result<Option<E>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let normalized = trimmed.to_ascii_uppercase().replace([' ', '-'], "_");
    serde_json::from_value(Value::String(normalized))
        .map(Some)
        .map_err(|_| FieldError::new(field, message))
}

/// Date input to the backend's `LocalDateTime` wire form at midnight.
pub fn start_of_day(raw: &str) -> Option<String> {
    lenient::parse_date(raw).map(|d| format!("{}T00:00:00", d.format("%Y-%m-%d")))
}

pub fn iso_date(raw: &str) -> Option<String> {
    lenient::parse_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn iso_time(raw: &str) -> Option<String> {
    lenient::parse_time(raw).map(|t| t.format("%H:%M:%S").to_string())
}

/// Collects field errors while validating a form.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, field: &str, raw: &str, label: &str) -> &mut Self {
        self.0.extend(required(field, raw, label));
        self
    }

    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.push(e);
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_round_trip_through_inputs() {
        let stored = NaiveDate::from_ymd_opt(1990, 7, 4).unwrap().and_hms_opt(0, 0, 0);
        assert_eq!(form_date_of(stored), "1990-07-04");
        assert_eq!(form_date(None), "");
        assert_eq!(start_of_day("1990-07-04").as_deref(), Some("1990-07-04T00:00:00"));
        assert_eq!(start_of_day(""), None);
        assert_eq!(start_of_day("04/07/1990"), None);
    }

    #[test]
    fn invalid_inputs_become_field_errors() {
        assert_eq!(parse_number_field::<f64>("amount", "12.5").unwrap(), Some(12.5));
        assert_eq!(parse_number_field::<f64>("amount", "").unwrap(), None);
        assert_eq!(parse_number_field::<i32>("stock", "ten").unwrap_err().field, "stock");
        assert!(parse_date_field("hireDate", "yesterday").is_err());
        assert_eq!(parse_time_field("time", "09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn collector_keeps_every_problem() {
        let mut errors = FieldErrors::new();
        errors.require("email", " ", "Email").require("name", "Ada", "Name");
        let parsed = errors.check(parse_number_field::<i32>("age", "x"));
        assert!(parsed.is_none());

        let errors = errors.into_vec();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Email is required");
        assert_eq!(errors[1].field, "age");
    }

    #[test]
    fn choices_read_as_wire_names() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        enum Kind {
            FollowUp,
        }

        assert_eq!(parse_choice_field::<Kind>("kind", "follow up", "Pick one").unwrap(), Some(Kind::FollowUp));
        assert_eq!(parse_choice_field::<Kind>("kind", "", "Pick one").unwrap(), None);
        assert_eq!(parse_choice_field::<Kind>("kind", "later", "Pick one").unwrap_err().message, "Pick one");
    }

    #[test]
    fn blank_text_is_omitted() {
        assert_eq!(blank_to_none("  "), None);
        assert_eq!(blank_to_none(" x ").as_deref(), Some("x"));
        assert_eq!(iso_time("09:05").as_deref(), Some("09:05:00"));
    }
}
