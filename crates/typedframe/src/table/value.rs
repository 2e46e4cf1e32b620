//! Scalar cell values.

use std::fmt;

use chrono::DateTime;
use serde::Serialize;

use crate::dtype::{DtypeSpec, PrimitiveKind};

/// A single cell of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing-value marker.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of `dtype` as is.
    pub fn fits(&self, dtype: &DtypeSpec) -> bool {
        match (self, dtype) {
            (Value::Null, _) | (_, DtypeSpec::Object) => true,
            (Value::Bool(_), DtypeSpec::Primitive { kind: PrimitiveKind::Bool, .. }) => true,
            (Value::Int(v), DtypeSpec::Primitive { kind: PrimitiveKind::Int, bits }) => {
                int_in_range(*v, *bits)
            }
            (Value::UInt(v), DtypeSpec::Primitive { kind: PrimitiveKind::UInt, bits }) => {
                uint_in_range(*v, *bits)
            }
            (Value::Float(_), DtypeSpec::Primitive { kind: PrimitiveKind::Float, .. }) => true,
            (Value::Str(label), DtypeSpec::Categorical { categories }) => {
                categories.contains(label)
            }
            (Value::Timestamp(_), DtypeSpec::DateTime { .. }) => true,
            _ => false,
        }
    }

    /// Render a timestamp as ISO 8601, optionally marked as UTC.
    pub fn format_timestamp(nanos: i64, utc: bool) -> String {
        let secs = nanos.div_euclid(1_000_000_000);
        let subsec = nanos.rem_euclid(1_000_000_000) as u32;
        match DateTime::from_timestamp(secs, subsec) {
            Some(dt) if utc => dt.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
            Some(dt) => dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            None => nanos.to_string(),
        }
    }
}

pub(crate) fn int_in_range(value: i64, bits: u8) -> bool {
    match bits {
        8 => i8::try_from(value).is_ok(),
        16 => i16::try_from(value).is_ok(),
        32 => i32::try_from(value).is_ok(),
        _ => true,
    }
}

pub(crate) fn uint_in_range(value: u64, bits: u8) -> bool {
    match bits {
        8 => u8::try_from(value).is_ok(),
        16 => u16::try_from(value).is_ok(),
        32 => u32::try_from(value).is_ok(),
        _ => true,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", Value::format_timestamp(*v, false)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
