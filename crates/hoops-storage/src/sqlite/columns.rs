//! Column encoding shared by every table module.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a `DateTime<Utc>` as ISO 8601 TEXT. Fixed width, so TEXT
/// comparison orders timestamps correctly.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub(crate) fn format_date(day: &NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}

fn conversion_error(row: &Row<'_>, column: &str, message: String) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// Reads a required timestamp column.
pub(crate) fn get_datetime(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_datetime(&raw)
        .ok_or_else(|| conversion_error(row, column, format!("invalid timestamp {raw:?}")))
}

/// Reads a nullable timestamp column.
pub(crate) fn get_opt_datetime(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(row, column, format!("invalid timestamp {s:?}"))),
    }
}

/// Reads a required calendar date column.
pub(crate) fn get_date(row: &Row<'_>, column: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(column)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| conversion_error(row, column, format!("invalid date {raw:?}: {e}")))
}

/// Reads a nullable calendar date column.
pub(crate) fn get_opt_date(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| conversion_error(row, column, format!("invalid date {s:?}: {e}"))),
    }
}

/// Reads a TEXT column into a closed enum.
pub(crate) fn get_enum<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(column)?;
    raw.parse::<T>()
        .map_err(|e| conversion_error(row, column, e.to_string()))
}

/// Reads an INTEGER 0/1 column.
pub(crate) fn get_bool(row: &Row<'_>, column: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(column)? != 0)
}
