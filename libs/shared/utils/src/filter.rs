//! Client-side filtering and search over fetched collections.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use shared_models::error::AppError;

/// Sentinel used by status drop-downs for "no filter".
pub const ALL: &str = "ALL";

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when `term` is blank or appears (case-insensitively) in any field.
pub fn matches_search(term: Option<&str>, fields: &[Option<&str>]) -> bool {
    match term.map(str::trim) {
        None | Some("") => true,
        Some(term) => fields.iter().flatten().any(|field| contains_ci(field, term)),
    }
}

/// Parses a drop-down value into the backend's enum. Empty and `ALL` mean
/// "no filter"; anything else must name a variant.
pub fn parse_choice<E: DeserializeOwned>(field: &str, raw: Option<&str>) -> Result<Option<E>, AppError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) if value.eq_ignore_ascii_case(ALL) => return Ok(None),
        Some(value) => value,
    };

    let normalized = raw.to_ascii_uppercase().replace([' ', '-'], "_");
    serde_json::from_value(Value::String(normalized))
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Unknown {} '{}'", field, raw)))
}

/// `filter` of `None` matches everything; a row without a value never
/// matches a concrete filter.
pub fn matches_eq<T: PartialEq>(value: Option<&T>, filter: Option<&T>) -> bool {
    match filter {
        None => true,
        Some(wanted) => value == Some(wanted),
    }
}

pub fn same_day(value: Option<NaiveDate>, filter: Option<NaiveDate>) -> bool {
    matches_eq(value.as_ref(), filter.as_ref())
}

pub fn matches_text(value: Option<&str>, filter: Option<&str>) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.map(|v| v.eq_ignore_ascii_case(wanted)).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    enum Status {
        Scheduled,
        InProgress,
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let fields = [Some("Jane Doe"), None, Some("PAT-001")];
        assert!(matches_search(Some("doe"), &fields));
        assert!(matches_search(Some("pat-0"), &fields));
        assert!(matches_search(Some("  "), &fields));
        assert!(matches_search(None, &fields));
        assert!(!matches_search(Some("smith"), &fields));
    }

    #[test]
    fn all_sentinel_disables_filter() {
        assert_eq!(parse_choice::<Status>("status", Some("ALL")).unwrap(), None);
        assert_eq!(parse_choice::<Status>("status", Some("")).unwrap(), None);
        assert_eq!(parse_choice::<Status>("status", None).unwrap(), None);
    }

    #[test]
    fn choices_accept_loose_spelling() {
        assert_eq!(
            parse_choice::<Status>("status", Some("in progress")).unwrap(),
            Some(Status::InProgress)
        );
        assert_eq!(
            parse_choice::<Status>("status", Some("scheduled")).unwrap(),
            Some(Status::Scheduled)
        );
        assert_matches!(
            parse_choice::<Status>("status", Some("DONE")),
            Err(AppError::BadRequest(msg)) if msg == "Unknown status 'DONE'"
        );
    }

    #[test]
    fn date_filter_is_exact_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(same_day(day, None));
        assert!(same_day(day, day));
        assert!(!same_day(None, day));
        assert!(!same_day(NaiveDate::from_ymd_opt(2024, 5, 2), day));
    }

    #[test]
    fn text_filter_ignores_case() {
        assert!(matches_text(Some("Cardiology"), Some("cardiology")));
        assert!(matches_text(None, None));
        assert!(!matches_text(None, Some("x")));
    }
}
