//! Value mapping between rowgate and SQLite storage classes

use rowgate_core::value::Value;
use rusqlite::types::Value as SqlValue;

/// Storage representation of a bound parameter; booleans become 0/1
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

/// Raw column value; declared types are applied later by the hydrator
pub(crate) fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        SqlValue::Real(f) => Value::Real(f),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans_are_stored_as_integers() {
        assert_eq!(to_sql(&Value::Boolean(true)), SqlValue::Integer(1));
        assert_eq!(to_sql(&Value::Boolean(false)), SqlValue::Integer(0));
    }

    #[test]
    fn test_storage_classes_come_back_raw() {
        assert_eq!(from_sql(SqlValue::Integer(1)), Value::Integer(1));
        assert_eq!(from_sql(SqlValue::Text("x".into())), Value::from("x"));
        assert_eq!(from_sql(SqlValue::Null), Value::Null);
    }
}
