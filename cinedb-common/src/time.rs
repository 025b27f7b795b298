//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Layout SQLite uses for `CURRENT_TIMESTAMP`
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp the way SQLite's `CURRENT_TIMESTAMP` does
///
/// Keeps application-written `updated_at` values comparable with the ones
/// produced by column defaults.
pub fn to_sql_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(SQL_TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time in SQLite timestamp layout
pub fn sql_now() -> String {
    to_sql_timestamp(now())
}
