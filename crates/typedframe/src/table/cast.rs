//! Value-level casting rules used by the in-memory engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::dtype::{DtypeSpec, PrimitiveKind};

use super::value::{int_in_range, uint_in_range, Value};

/// Naive timestamp layouts accepted when parsing text.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Cast a single value to `to`. Nulls stay null.
///
/// The error is a short human-readable reason; callers attach the column
/// name and dtypes.
pub fn cast_value(value: &Value, to: &DtypeSpec) -> Result<Value, String> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match to {
        DtypeSpec::Object => Ok(value.clone()),
        DtypeSpec::Primitive { kind, bits } => match kind {
            PrimitiveKind::Int => {
                let v = to_int(value)?;
                if int_in_range(v, *bits) {
                    Ok(Value::Int(v))
                } else {
                    Err(format!("{} overflows int{}", v, bits))
                }
            }
            PrimitiveKind::UInt => {
                let v = to_uint(value)?;
                if uint_in_range(v, *bits) {
                    Ok(Value::UInt(v))
                } else {
                    Err(format!("{} overflows uint{}", v, bits))
                }
            }
            PrimitiveKind::Float => {
                let v = to_float(value)?;
                if *bits == 32 {
                    let narrowed = v as f32;
                    if v.is_finite() && !narrowed.is_finite() {
                        return Err(format!("{} overflows float32", v));
                    }
                    Ok(Value::Float(f64::from(narrowed)))
                } else {
                    Ok(Value::Float(v))
                }
            }
            PrimitiveKind::Bool => to_bool(value).map(Value::Bool),
        },
        DtypeSpec::Categorical { categories } => {
            let label = value.to_string();
            if categories.contains(&label) {
                Ok(Value::Str(label))
            } else {
                Err(format!("unknown category '{}'", label))
            }
        }
        DtypeSpec::DateTime { .. } => to_timestamp(value).map(Value::Timestamp),
    }
}

fn to_int(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::UInt(v) => i64::try_from(*v).map_err(|_| format!("{} overflows int64", v)),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(format!("cannot convert non-finite {} to integer", v));
            }
            let truncated = v.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(format!("{} overflows int64", v));
            }
            Ok(truncated as i64)
        }
        Value::Bool(v) => Ok(i64::from(*v)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not an integer", s)),
        Value::Timestamp(v) => Ok(*v),
        Value::Null => Err("null".to_string()),
    }
}

fn to_uint(value: &Value) -> Result<u64, String> {
    match value {
        Value::UInt(v) => Ok(*v),
        Value::Str(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("'{}' is not an unsigned integer", s)),
        other => {
            let v = to_int(other)?;
            u64::try_from(v).map_err(|_| format!("{} is negative", v))
        }
    }
}

fn to_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        Value::UInt(v) => Ok(*v as f64),
        Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", s)),
        Value::Timestamp(_) => Err("cannot convert timestamp to float".to_string()),
        Value::Null => Err("null".to_string()),
    }
}

fn to_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(v) => Ok(*v),
        Value::Int(v) => Ok(*v != 0),
        Value::UInt(v) => Ok(*v != 0),
        Value::Float(v) if v.is_finite() => Ok(*v != 0.0),
        Value::Str(s) => parse_bool(s).ok_or_else(|| format!("'{}' is not a boolean", s)),
        other => Err(format!("cannot convert {:?} to bool", other)),
    }
}

fn to_timestamp(value: &Value) -> Result<i64, String> {
    match value {
        Value::Timestamp(v) => Ok(*v),
        Value::Int(v) => Ok(*v),
        Value::Str(s) => parse_timestamp(s).ok_or_else(|| format!("'{}' is not a timestamp", s)),
        other => Err(format!("cannot convert {:?} to timestamp", other)),
    }
}

/// Parse the boolean literals commonly found in delimited files.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "t" | "y" | "1" => Some(true),
        "false" | "no" | "f" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a timestamp into nanoseconds since the epoch.
///
/// Offsets are normalized to UTC; naive values are taken as wall-clock UTC.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp_nanos_opt();
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return naive.and_utc().timestamp_nanos_opt();
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_utc().timestamp_nanos_opt())
}
