use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{StorageError, StoredValue};

pub(crate) const KIND_INT: &str = "int";
pub(crate) const KIND_TIMESTAMP: &str = "timestamp";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Column values for a stored value: `(kind, int_value, timestamp_value)`.
pub(crate) fn value_columns(
    value: StoredValue,
) -> (&'static str, Option<i64>, Option<DateTime<Utc>>) {
    match value {
        StoredValue::Int(v) => (KIND_INT, Some(v), None),
        StoredValue::Timestamp(t) => (KIND_TIMESTAMP, None, Some(t)),
    }
}

pub(crate) fn map_value_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredValue, StorageError> {
    let kind: String = row.try_get("kind").map_err(ser)?;
    match kind.as_str() {
        KIND_INT => {
            let value: Option<i64> = row.try_get("int_value").map_err(ser)?;
            value
                .map(StoredValue::Int)
                .ok_or_else(|| StorageError::Serialization("missing int_value".into()))
        }
        KIND_TIMESTAMP => {
            let value: Option<DateTime<Utc>> = row.try_get("timestamp_value").map_err(ser)?;
            value
                .map(StoredValue::Timestamp)
                .ok_or_else(|| StorageError::Serialization("missing timestamp_value".into()))
        }
        other => Err(StorageError::Serialization(format!(
            "invalid value kind: {other}"
        ))),
    }
}
