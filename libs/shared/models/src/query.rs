//! Query-string field decoding for filter forms.
//!
//! A filter form submits every input, so an untouched field arrives as
//! `?date=`. Blank values mean "no filter"; anything else must parse.
//!
//! Use with `#[serde(default, deserialize_with = "shared_models::query::date")]`.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, Error, IntoDeserializer};
use serde::{Deserialize, Deserializer};

use crate::lenient;

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Numbers and flags; blank is `None`.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    non_blank(deserializer)?
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| D::Error::custom(format!("'{}' is not valid here: {}", raw, e)))
        })
        .transpose()
}

/// `YYYY-MM-DD` (or a date-time, truncated to its day); blank is `None`.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    non_blank(deserializer)?
        .map(|raw| lenient::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("'{}' is not a date", raw))))
        .transpose()
}

/// Unit-variant choices such as a listing mode; blank keeps the default.
pub fn choice_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match non_blank(deserializer)? {
        Some(raw) => {
            let choice: StrDeserializer<'_, D::Error> = raw.as_str().into_deserializer();
            T::deserialize(choice)
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    enum Mode {
        #[default]
        All,
        DateRange,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "date")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional")]
        low_stock: Option<bool>,
        #[serde(default, deserialize_with = "optional")]
        department_id: Option<i64>,
        #[serde(default, deserialize_with = "choice_or_default")]
        mode: Mode,
    }

    #[test]
    fn blank_inputs_mean_no_filter() {
        let filter: Filter =
            serde_json::from_value(json!({ "date": "", "low_stock": " ", "department_id": "", "mode": "" })).unwrap();

        assert_eq!(filter.date, None);
        assert_eq!(filter.low_stock, None);
        assert_eq!(filter.department_id, None);
        assert_eq!(filter.mode, Mode::All);
    }

    #[test]
    fn filled_inputs_are_parsed() {
        let filter: Filter = serde_json::from_value(
            json!({ "date": "2024-03-01", "low_stock": "true", "department_id": "7", "mode": "date-range" }),
        )
        .unwrap();

        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(filter.low_stock, Some(true));
        assert_eq!(filter.department_id, Some(7));
        assert_eq!(filter.mode, Mode::DateRange);
    }

    #[test]
    fn missing_inputs_use_defaults() {
        let filter: Filter = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filter.date, None);
        assert_eq!(filter.mode, Mode::All);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = serde_json::from_value::<Filter>(json!({ "date": "yesterday" })).unwrap_err();
        assert!(err.to_string().contains("'yesterday' is not a date"));

        assert!(serde_json::from_value::<Filter>(json!({ "department_id": "cardio" })).is_err());
    }
}
