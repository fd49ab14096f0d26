//! Lenient deadline parsing.
//!
//! Browsers submit `<input type="datetime-local">` values without an offset
//! (`2025-03-01T17:30`) and an empty string when the field is cleared, so deadlines
//! accept those forms alongside RFC 3339. Offset-less values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses a deadline string. Blank input means "no deadline".
pub fn parse_deadline(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(Utc.from_utc_datetime(&midnight)));
    }
    Err(format!("unrecognized deadline {:?}", raw))
}

/// `deserialize_with` target for `Option<DateTime<Utc>>` fields.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_deadline(&raw).map_err(de::Error::custom),
        None => Ok(None),
    }
}

/// `deserialize_with` target for patch fields. Pair with `#[serde(default)]`:
/// an absent key stays `None`, while `null` or `""` become `Some(None)` (clear).
pub fn deserialize_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_deadline_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 17, 30, 0).unwrap();

        assert_eq!(parse_deadline("2025-03-01T17:30:00Z").unwrap(), Some(expected));
        assert_eq!(parse_deadline("2025-03-01T19:30:00+02:00").unwrap(), Some(expected));
        assert_eq!(parse_deadline("2025-03-01T17:30").unwrap(), Some(expected));
        assert_eq!(parse_deadline("2025-03-01T17:30:00").unwrap(), Some(expected));
        assert_eq!(
            parse_deadline("2025-03-01").unwrap(),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_deadline_blank_and_garbage() {
        assert_eq!(parse_deadline("").unwrap(), None);
        assert_eq!(parse_deadline("   ").unwrap(), None);
        assert!(parse_deadline("next tuesday").is_err());
    }
}
