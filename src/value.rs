use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};

/// A single column value as read from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// TEXT whose bytes are not valid UTF-8, kept verbatim so it binds back unchanged.
    RawText(Vec<u8>),
    Blob(Vec<u8>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Converts to a key value; NULL and REAL values cannot identify a row.
    pub fn as_key(&self) -> Option<KeyValue> {
        match self {
            Scalar::Integer(v) => Some(KeyValue::Integer(*v)),
            Scalar::Text(v) => Some(KeyValue::Text(v.clone())),
            Scalar::RawText(v) => Some(KeyValue::RawText(v.clone())),
            Scalar::Blob(v) => Some(KeyValue::Blob(v.clone())),
            Scalar::Null | Scalar::Real(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("NULL"),
            Scalar::Integer(v) => write!(f, "{v}"),
            Scalar::Real(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
            Scalar::RawText(v) => f.write_str(&String::from_utf8_lossy(v)),
            Scalar::Blob(v) => write_blob(f, v),
        }
    }
}

impl From<ValueRef<'_>> for Scalar {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Scalar::Null,
            ValueRef::Integer(v) => Scalar::Integer(v),
            ValueRef::Real(v) => Scalar::Real(v),
            ValueRef::Text(v) => match std::str::from_utf8(v) {
                Ok(text) => Scalar::Text(text.to_string()),
                Err(_) => Scalar::RawText(v.to_vec()),
            },
            ValueRef::Blob(v) => Scalar::Blob(v.to_vec()),
        }
    }
}

impl From<KeyValue> for Scalar {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::Integer(v) => Scalar::Integer(v),
            KeyValue::Text(v) => Scalar::Text(v),
            KeyValue::RawText(v) => Scalar::RawText(v),
            KeyValue::Blob(v) => Scalar::Blob(v),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Null => ToSqlOutput::Owned(Value::Null),
            Scalar::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Scalar::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Scalar::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Scalar::RawText(v) => ToSqlOutput::Borrowed(ValueRef::Text(v)),
            Scalar::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

/// A primary-key value. Equality, hashing and ordering are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Integer(i64),
    Text(String),
    RawText(Vec<u8>),
    Blob(Vec<u8>),
}

impl KeyValue {
    /// Reads a key with no schema to consult: an exact integer literal becomes an
    /// integer, anything else (surrounding whitespace included) is kept as text.
    pub fn parse(input: &str) -> Self {
        match input.parse::<i64>() {
            Ok(v) => KeyValue::Integer(v),
            Err(_) => KeyValue::Text(input.to_string()),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Integer(v) => write!(f, "{v}"),
            KeyValue::Text(v) => f.write_str(v),
            KeyValue::RawText(v) => f.write_str(&String::from_utf8_lossy(v)),
            KeyValue::Blob(v) => write_blob(f, v),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Integer(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl ToSql for KeyValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            KeyValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            KeyValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            KeyValue::RawText(v) => ToSqlOutput::Borrowed(ValueRef::Text(v)),
            KeyValue::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

fn write_blob(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("x'")?;
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    f.write_str("'")
}
