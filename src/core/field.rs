//! Typed key/value fields attached to log records
//!
//! Fields are built with the free constructors in this module
//! (`string`, `int`, `bool`, ...) and are immutable afterwards.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Arbitrary JSON produced by [`any`].
    Json(serde_json::Value),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// A key/value pair attached to a log record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

pub fn string(key: impl Into<String>, value: impl Into<String>) -> Field {
    Field::new(key, FieldValue::String(value.into()))
}

pub fn int(key: impl Into<String>, value: i64) -> Field {
    Field::new(key, FieldValue::Int(value))
}

pub fn uint(key: impl Into<String>, value: u64) -> Field {
    Field::new(key, FieldValue::Uint(value))
}

pub fn float(key: impl Into<String>, value: f64) -> Field {
    Field::new(key, FieldValue::Float(value))
}

pub fn bool(key: impl Into<String>, value: bool) -> Field {
    Field::new(key, FieldValue::Bool(value))
}

/// Duration encoded as fractional seconds.
pub fn duration(key: impl Into<String>, value: Duration) -> Field {
    Field::new(key, FieldValue::Float(value.as_secs_f64()))
}

/// Error message under the conventional `"error"` key.
pub fn error(err: &dyn std::error::Error) -> Field {
    Field::new("error", FieldValue::String(err.to_string()))
}

pub fn null(key: impl Into<String>) -> Field {
    Field::new(key, FieldValue::Null)
}

/// Any serializable value.
///
/// Values that fail to serialize are recorded as the serializer's error text
/// so the record itself is never lost.
pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Field {
    let value = match serde_json::to_value(value) {
        Ok(json) => FieldValue::Json(json),
        Err(e) => FieldValue::String(format!("<unserializable: {}>", e)),
    };
    Field::new(key, value)
}
