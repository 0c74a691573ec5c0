//! Cell formatting for table rows. Missing values render as `N/A`.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const MISSING: &str = "N/A";

pub fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

pub fn value<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_string())
}

pub fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    let joined = [first, last]
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        MISSING.to_string()
    } else {
        joined
    }
}

pub fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn date_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|d| d.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn time(value: Option<NaiveTime>) -> String {
    value
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes".to_string(),
        Some(false) => "No".to_string(),
        None => MISSING.to_string(),
    }
}
