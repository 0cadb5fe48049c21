use chrono::{DateTime, Utc};

/// Jira REST timestamps carry a numeric offset without a colon: `2024-03-01T10:15:30.123+0000`
const JIRA_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parse a timestamp in either of the formats Jira emits.
///
/// The agile API uses `2024-03-01T10:15:30.123Z` (RFC 3339), the core REST API
/// uses an offset without a colon.
#[must_use]
pub fn parse_jira_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, JIRA_OFFSET_FORMAT))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Parse an optional timestamp field, logging and dropping values that do not parse
pub(crate) fn parse_optional(field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = parse_jira_timestamp(raw);
    if parsed.is_none() {
        log::warn!("Ignoring unparseable {field} timestamp: {raw}");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_agile_format() {
        let dt = parse_jira_timestamp("2024-03-01T10:15:30.123Z").unwrap();
        assert_eq!(
            dt,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_parse_rest_offset_format() {
        let dt = parse_jira_timestamp("2024-03-01T12:15:30.000+0200").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_jira_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_optional_blank_is_none() {
        assert!(parse_optional("startDate", Some("  ")).is_none());
        assert!(parse_optional("startDate", None).is_none());
    }
}
