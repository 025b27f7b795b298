//! Conversion of SQLite result rows into flat records
//!
//! Join queries are read as untyped rows so that one conversion serves every
//! response shape; the normalizer works on the resulting [`FlatRecord`]s.

use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::normalize::FlatRecord;

/// Convert one result row to a flat record keyed by column name
///
/// Mapping: NULL → null, INTEGER → number, REAL → number, TEXT → string.
/// Columns declared `BOOLEAN` become JSON booleans. BLOBs are not part of the
/// schema and map to null.
pub fn row_to_record(row: &SqliteRow) -> FlatRecord {
    row.columns()
        .iter()
        .map(|column| {
            let value = column_value(row, column.ordinal(), column.type_info().name());
            (column.name().to_string(), value)
        })
        .collect()
}

/// Convert every row of a result set, preserving order
pub fn rows_to_records(rows: &[SqliteRow]) -> Vec<FlatRecord> {
    rows.iter().map(row_to_record).collect()
}

fn column_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let Ok(raw) = row.try_get_raw(index) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }

    // Storage class of this value, not the declared column type
    let storage = raw.type_info().name().to_string();

    if declared.eq_ignore_ascii_case("BOOLEAN") {
        return row
            .try_get_unchecked::<bool, _>(index)
            .map(Value::Bool)
            .unwrap_or(Value::Null);
    }

    match storage.as_str() {
        "INTEGER" => row
            .try_get_unchecked::<i64, _>(index)
            .map(|v| json!(v))
            .unwrap_or(Value::Null),
        "REAL" => row
            .try_get_unchecked::<f64, _>(index)
            .map(|v| json!(v))
            .unwrap_or(Value::Null),
        "TEXT" => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
