//! Query layer for cinedb-api
//!
//! Every query returns ordered [`FlatRecord`](cinedb_common::FlatRecord)s;
//! shaping into nested responses happens in the handlers.

pub mod movies;
pub mod reviews;
pub mod theaters;

/// Parse a numeric id from a path segment
///
/// Anything that is not a positive integer cannot name a row, so callers treat
/// `None` as "not found".
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
