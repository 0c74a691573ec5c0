//! Tolerant date/time decoding for backend payloads.
//!
//! The backend emits ISO strings, but older builds serialise `LocalDate` and
//! `LocalDateTime` as arrays (`[2024, 1, 5]`, `[2024, 1, 5, 9, 30]`). A value
//! that cannot be read becomes `None` so one bad row never fails a screen.
//!
//! Use with `#[serde(default, with = "shared_models::lenient::date")]`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_time(raw).map(|dt| dt.date()))
}

pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn parts(values: &[Value]) -> Option<Vec<u32>> {
    values
        .iter()
        .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
        .collect()
}

fn date_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Array(items) if items.len() >= 3 => {
            let year = items[0].as_i64().and_then(|y| i32::try_from(y).ok())?;
            let rest = parts(&items[1..3])?;
            NaiveDate::from_ymd_opt(year, rest[0], rest[1])
        }
        _ => None,
    }
}

fn date_time_from_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date_time(s),
        Value::Array(items) if items.len() >= 3 => {
            let date = date_from_value(value)?;
            let clock = parts(&items[3..items.len().min(6)])?;
            let hour = clock.first().copied().unwrap_or(0);
            let minute = clock.get(1).copied().unwrap_or(0);
            let second = clock.get(2).copied().unwrap_or(0);
            date.and_hms_opt(hour, minute, second)
        }
        _ => None,
    }
}

fn time_from_value(value: &Value) -> Option<NaiveTime> {
    match value {
        Value::String(s) => parse_time(s),
        Value::Array(items) if items.len() >= 2 => {
            let clock = parts(&items[..items.len().min(3)])?;
            NaiveTime::from_hms_opt(clock[0], clock[1], clock.get(2).copied().unwrap_or(0))
        }
        _ => None,
    }
}

macro_rules! lenient_field {
    ($name:ident, $ty:ty, $reader:path, $fmt:expr) => {
        pub mod $name {
            use serde::{Deserialize, Deserializer, Serializer};
            use serde_json::Value;

            pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<$ty>, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = Option::<Value>::deserialize(deserializer)?;
                Ok(raw.as_ref().and_then($reader))
            }

            pub fn serialize<S>(value: &Option<$ty>, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                match value {
                    Some(v) => serializer.serialize_str(&v.format($fmt).to_string()),
                    None => serializer.serialize_none(),
                }
            }
        }
    };
}

lenient_field!(date, chrono::NaiveDate, super::date_from_value, "%Y-%m-%d");
lenient_field!(date_time, chrono::NaiveDateTime, super::date_time_from_value, "%Y-%m-%dT%H:%M:%S");
lenient_field!(time, chrono::NaiveTime, super::time_from_value, "%H:%M:%S");

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(default, with = "crate::lenient::date")]
        day: Option<NaiveDate>,
        #[serde(default, with = "crate::lenient::date_time")]
        at: Option<NaiveDateTime>,
        #[serde(default, with = "crate::lenient::time")]
        clock: Option<NaiveTime>,
    }

    #[test]
    fn reads_iso_strings() {
        let row: Row = serde_json::from_value(json!({
            "day": "2024-03-01",
            "at": "2024-03-01T09:15:00.123",
            "clock": "09:15"
        }))
        .unwrap();
        assert_eq!(row.day, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(row.at.unwrap().format("%H:%M").to_string(), "09:15");
        assert_eq!(row.clock, NaiveTime::from_hms_opt(9, 15, 0));
    }

    #[test]
    fn reads_array_form() {
        let row: Row = serde_json::from_value(json!({
            "day": [2024, 3, 1],
            "at": [2024, 3, 1, 9, 15],
            "clock": [9, 15, 30]
        }))
        .unwrap();
        assert_eq!(row.day, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(row.at, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 15, 0));
        assert_eq!(row.clock, NaiveTime::from_hms_opt(9, 15, 30));
    }

    #[test]
    fn garbage_and_missing_become_none() {
        let row: Row = serde_json::from_value(json!({ "day": "not a date", "at": 42 })).unwrap();
        assert!(row.day.is_none());
        assert!(row.at.is_none());
        assert!(row.clock.is_none());
    }

    #[test]
    fn date_time_accepts_offsets_and_bare_dates() {
        assert_eq!(
            parse_date_time("2024-03-01T09:15:00Z").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_date_time("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_date("2024-03-01T23:59:59"), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn serializes_back_to_iso() {
        let row = Row {
            day: NaiveDate::from_ymd_opt(2024, 3, 1),
            at: None,
            clock: NaiveTime::from_hms_opt(8, 0, 0),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value, json!({ "day": "2024-03-01", "at": null, "clock": "08:00:00" }));
    }
}
