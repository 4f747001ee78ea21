//! Scalar values and declared column types
//!
//! `Value` is what travels between the gateway and its collaborators.
//! `ColumnType::to_native` turns the storage representation a driver hands
//! back (e.g. SQLite's `0`/`1` booleans) into the representation the
//! column was declared with.

use crate::errors::{GatewayError, Result};

/// A single column value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    BigInt,
    Boolean,
    Float,
    String,
    Text,
    Blob,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
        }
    }

    /// Convert a stored or caller-supplied value into this type's native
    /// representation
    ///
    /// NULL stays NULL for every type.
    pub fn to_native(&self, column: &str, value: Value) -> Result<Value> {
        let converted = match (self, value) {
            (_, Value::Null) => Ok(Value::Null),

            (ColumnType::Integer | ColumnType::BigInt, value) => match value {
                Value::Integer(i) => Ok(Value::Integer(i)),
                Value::Boolean(b) => Ok(Value::Integer(i64::from(b))),
                Value::Real(f) if f.fract() == 0.0 => Ok(Value::Integer(f as i64)),
                Value::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| format!("'{}' is not an integer", s)),
                other => Err(format!("unexpected {} value", other.type_name())),
            },

            (ColumnType::Boolean, value) => match value {
                Value::Boolean(b) => Ok(Value::Boolean(b)),
                Value::Integer(i) => Ok(Value::Boolean(i != 0)),
                Value::Real(f) => Ok(Value::Boolean(f != 0.0)),
                Value::Text(s) => parse_bool(&s)
                    .map(Value::Boolean)
                    .ok_or_else(|| format!("'{}' is not a boolean", s)),
                other => Err(format!("unexpected {} value", other.type_name())),
            },

            (ColumnType::Float, value) => match value {
                Value::Real(f) => Ok(Value::Real(f)),
                Value::Integer(i) => Ok(Value::Real(i as f64)),
                Value::Boolean(b) => Ok(Value::Real(if b { 1.0 } else { 0.0 })),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Real)
                    .map_err(|_| format!("'{}' is not a number", s)),
                other => Err(format!("unexpected {} value", other.type_name())),
            },

            (ColumnType::String | ColumnType::Text, value) => match value {
                Value::Text(s) => Ok(Value::Text(s)),
                Value::Integer(i) => Ok(Value::Text(i.to_string())),
                Value::Real(f) => Ok(Value::Text(format!("{:?}", f))),
                // Booleans are stored as 0/1
                Value::Boolean(b) => Ok(Value::Text(i64::from(b).to_string())),
                Value::Blob(bytes) => String::from_utf8(bytes)
                    .map(Value::Text)
                    .map_err(|_| "blob is not valid UTF-8".to_string()),
                Value::Null => Ok(Value::Null),
            },

            (ColumnType::Blob, value) => match value {
                Value::Text(s) => Ok(Value::Blob(s.into_bytes())),
                other => Ok(other),
            },
        };

        converted.map_err(|reason| GatewayError::ValueConversion {
            column: column.to_string(),
            column_type: self.name().to_string(),
            reason,
        })
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}
