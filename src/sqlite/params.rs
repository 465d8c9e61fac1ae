use rusqlite::types::{Value as SqliteValue, ValueRef};

use crate::engine::{EngineError, Value};

/// Convert an engine value into what `SQLite` stores.
///
/// Temporal values are stored as text in the `%F %T%.f` family of formats, decimals as their
/// textual form, booleans as `0`/`1`.
///
/// # Errors
/// Intervals and arrays have no `SQLite` representation.
pub fn to_sqlite_value(value: &Value) -> Result<SqliteValue, EngineError> {
    Ok(match value {
        Value::Null => SqliteValue::Null,
        Value::Boolean(b) => SqliteValue::Integer(i64::from(*b)),
        Value::TinyInt(v) => SqliteValue::Integer(i64::from(*v)),
        Value::SmallInt(v) => SqliteValue::Integer(i64::from(*v)),
        Value::Integer(v) => SqliteValue::Integer(i64::from(*v)),
        Value::BigInt(v) => SqliteValue::Integer(*v),
        Value::Real(v) => SqliteValue::Real(f64::from(*v)),
        Value::Double(v) => SqliteValue::Real(*v),
        Value::Binary(b) | Value::Varbinary(b) | Value::Blob(b) => SqliteValue::Blob(b.clone()),
        Value::Interval(_) | Value::Array(_) => {
            return Err(EngineError::feature_not_supported(format!(
                "{} values cannot be stored in SQLite",
                value.type_tag()
            )));
        }
        // everything else has a canonical text form
        other => SqliteValue::Text(other.get_string()?),
    })
}

/// Convert one `SQLite` column value into an engine value, by storage class.
///
/// # Errors
/// Text that is not valid UTF-8.
pub fn from_sqlite_value(value: ValueRef<'_>) -> Result<Value, EngineError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::BigInt(i),
        ValueRef::Real(f) => Value::Double(f),
        ValueRef::Text(bytes) => Value::Varchar(
            std::str::from_utf8(bytes)
                .map_err(|e| {
                    EngineError::data_conversion(format!("invalid UTF-8 in text column: {e}"))
                })?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Varbinary(bytes.to_vec()),
    })
}
