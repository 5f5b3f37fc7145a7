//! Date parsing and display helpers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a date string in long form, e.g. `Sunday, January 14, 2024`.
///
/// Returns `None` for empty or unparseable input.
pub fn format_date(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    parse_date(value).map(|dt| dt.format("%A, %B %-d, %Y").to_string())
}

/// Serde helper for required date fields.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`")))
}

/// Serde helper for optional date fields.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`"))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let dt = parse_date("2024-01-14").expect("date");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 14));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        let dt = parse_date("2024-01-14T10:00:00+02:00").expect("date");
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date("14/01/2024").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date("2024-01-14").as_deref(),
            Some("Sunday, January 14, 2024")
        );
        assert_eq!(
            format_date("2023-07-04T09:30:00Z").as_deref(),
            Some("Tuesday, July 4, 2023")
        );
        assert_eq!(format_date(""), None);
        assert_eq!(format_date("soon"), None);
    }

    #[test]
    fn test_deserialize_helpers() {
        #[derive(Deserialize)]
        struct Dates {
            #[serde(deserialize_with = "deserialize_date")]
            date: DateTime<Utc>,
            #[serde(default, deserialize_with = "deserialize_optional_date")]
            updated: Option<DateTime<Utc>>,
        }

        let dates: Dates = serde_json::from_str(r#"{"date": "2024-02-01"}"#).unwrap();
        assert_eq!(dates.date.month(), 2);
        assert!(dates.updated.is_none());

        let raw = r#"{"date": "2024-02-01", "updated": "2024-03-01T12:00:00Z"}"#;
        let dates: Dates = serde_json::from_str(raw).unwrap();
        assert_eq!(dates.updated.map(|d| d.month()), Some(3));

        assert!(serde_json::from_str::<Dates>(r#"{"date": "tomorrow"}"#).is_err());
    }
}
