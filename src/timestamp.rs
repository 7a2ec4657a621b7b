//! Conversions between date-times and the formats used in the database and the API.
//!
//! Instants are stored in SQLite as integer milliseconds since the Unix epoch.

use rusqlite::{Row, types::Type};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::Error;

/// Milliseconds since the Unix epoch for `date_time`.
pub fn to_millis(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}

/// The UTC date-time `millis` milliseconds after the Unix epoch.
pub fn from_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

/// Read the epoch-millisecond column at `index` as a date-time.
pub fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let millis: i64 = row.get(index)?;

    from_millis(millis).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

/// Read the nullable epoch-millisecond column at `index` as a date-time.
pub fn get_optional_timestamp(
    row: &Row,
    index: usize,
) -> Result<Option<OffsetDateTime>, rusqlite::Error> {
    let millis: Option<i64> = row.get(index)?;

    millis
        .map(|millis| {
            from_millis(millis).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
            })
        })
        .transpose()
}

/// Parse a date-time submitted by a client.
///
/// Accepts RFC 3339 strings, e.g. "2026-01-05T10:00:00Z", or a plain date,
/// e.g. "2026-01-05", which is taken as midnight at `local_offset`.
pub fn parse_timestamp(text: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time);
    }

    parse_date(text).map(|date| date.midnight().assume_offset(local_offset))
}

/// Parse the request field `field_name` with [parse_timestamp].
///
/// # Errors
///
/// Returns [Error::Validation] naming the field if `text` is not a valid date or date-time.
pub fn parse_timestamp_field(
    field_name: &str,
    text: &str,
    local_offset: UtcOffset,
) -> Result<OffsetDateTime, Error> {
    parse_timestamp(text, local_offset).ok_or_else(|| {
        Error::Validation(format!(
            "{field_name} must be an RFC 3339 date-time or a YYYY-MM-DD date, got \"{text}\""
        ))
    })
}

/// Parse a plain date, e.g. "2026-01-05".
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}
