//! Database helper functions for safe type conversions.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

/// Serialize a timestamp in the single format every table uses.
///
/// Millisecond precision with a `Z` suffix keeps the text fixed-width, so
/// lexical order in SQL matches chronological order.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a UUID string from database, returning a rusqlite error on failure.
pub fn parse_uuid(idx: usize, s: &str) -> rusqlite::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a stored timestamp, returning a rusqlite error on failure.
pub fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a nullable timestamp column
pub fn get_optional_timestamp(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| parse_timestamp(idx, &s))
        .transpose()
}
