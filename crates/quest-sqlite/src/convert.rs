//! Conversion between Quest values and SQLite values

use quest_core::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::error::{Result, SqliteError};

/// Quest value as a SQLite parameter
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// SQLite column value as a Quest value; blobs are rejected
pub fn from_sql(column: &str, value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(r) => Ok(Value::Real(r)),
        ValueRef::Text(bytes) => Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Err(SqliteError::UnsupportedValue(column.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_sql() {
        assert_eq!(to_sql(&Value::from("x")), SqlValue::Text("x".into()));
        assert_eq!(to_sql(&Value::Integer(3)), SqlValue::Integer(3));
        assert_eq!(to_sql(&Value::Null), SqlValue::Null);
    }

    #[test]
    fn test_from_sql() {
        assert_eq!(
            from_sql("name", ValueRef::Text(b"Jane Doe")).unwrap(),
            Value::from("Jane Doe")
        );
        assert_eq!(from_sql("score", ValueRef::Real(53.0)).unwrap(), Value::Real(53.0));
        assert!(matches!(
            from_sql("avatar", ValueRef::Blob(&[0u8, 1])),
            Err(SqliteError::UnsupportedValue(c)) if c == "avatar"
        ));
    }
}
