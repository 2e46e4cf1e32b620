//! Column dtype descriptors and the equivalence rules between them.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SchemaError};

// =============================================================================
// TEXT FORM PATTERNS
// =============================================================================

static DATETIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^datetime64\[ns(?:,\s*(?i:utc))?\]$").unwrap());

static CATEGORY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:category)\[(.*)\]$").unwrap());

/// Scalar kind of a primitive column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// IEEE floating point.
    Float,
    /// Boolean (stored as one byte).
    Bool,
}

impl PrimitiveKind {
    /// Bit widths this kind can be declared with.
    pub fn valid_widths(&self) -> &'static [u8] {
        match self {
            PrimitiveKind::Int | PrimitiveKind::UInt => &[8, 16, 32, 64],
            PrimitiveKind::Float => &[32, 64],
            PrimitiveKind::Bool => &[8],
        }
    }
}

/// Declared (or observed) type of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DtypeSpec {
    /// Numeric or boolean scalar with a fixed bit width.
    Primitive { kind: PrimitiveKind, bits: u8 },
    /// Catch-all object column. Contents are never inspected.
    Object,
    /// Categorical with an ordered list of labels.
    Categorical { categories: Vec<String> },
    /// Nanosecond timestamps, naive or fixed to UTC.
    DateTime { utc: bool },
}

impl DtypeSpec {
    /// Build a primitive dtype, rejecting widths the kind does not support.
    pub fn primitive(kind: PrimitiveKind, bits: u8) -> Result<Self> {
        if !kind.valid_widths().contains(&bits) {
            return Err(SchemaError::Declaration(format!(
                "{:?} does not support a width of {} bits",
                kind, bits
            )));
        }
        Ok(DtypeSpec::Primitive { kind, bits })
    }

    pub fn int8() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Int, bits: 8 }
    }

    pub fn int16() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Int, bits: 16 }
    }

    pub fn int32() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Int, bits: 32 }
    }

    pub fn int64() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Int, bits: 64 }
    }

    pub fn uint8() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::UInt, bits: 8 }
    }

    pub fn uint16() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::UInt, bits: 16 }
    }

    pub fn uint32() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::UInt, bits: 32 }
    }

    pub fn uint64() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::UInt, bits: 64 }
    }

    pub fn float32() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Float, bits: 32 }
    }

    pub fn float64() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Float, bits: 64 }
    }

    pub fn bool() -> Self {
        DtypeSpec::Primitive { kind: PrimitiveKind::Bool, bits: 8 }
    }

    pub fn object() -> Self {
        DtypeSpec::Object
    }

    /// Naive `datetime64[ns]`.
    pub fn datetime() -> Self {
        DtypeSpec::DateTime { utc: false }
    }

    /// UTC-aware `datetime64[ns, UTC]`.
    pub fn datetime_utc() -> Self {
        DtypeSpec::DateTime { utc: true }
    }

    /// Build a categorical dtype. Labels must be unique.
    pub fn categorical<I, S>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        for (i, label) in categories.iter().enumerate() {
            if categories[..i].contains(label) {
                return Err(SchemaError::Declaration(format!(
                    "duplicate category label '{}'",
                    label
                )));
            }
        }
        Ok(DtypeSpec::Categorical { categories })
    }

    /// Returns true if this dtype holds numbers (integers or floats).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DtypeSpec::Primitive {
                kind: PrimitiveKind::Int | PrimitiveKind::UInt | PrimitiveKind::Float,
                ..
            }
        )
    }

    /// Check that a declared dtype is well formed.
    pub fn check(&self) -> Result<()> {
        match self {
            DtypeSpec::Primitive { kind, bits } => DtypeSpec::primitive(*kind, *bits).map(|_| ()),
            DtypeSpec::Categorical { categories } => {
                DtypeSpec::categorical(categories.iter().cloned()).map(|_| ())
            }
            DtypeSpec::Object | DtypeSpec::DateTime { .. } => Ok(()),
        }
    }

    /// Whether an observed dtype satisfies this declared dtype.
    pub fn matches(&self, observed: &DtypeSpec) -> bool {
        matches(self, observed)
    }
}

/// Decide whether an observed column dtype satisfies a declared one.
///
/// No implicit widening: `int32` never satisfies `int64`. Categoricals must
/// carry the same labels in the same order. Object columns always match
/// each other since their contents are not inspected.
pub fn matches(declared: &DtypeSpec, observed: &DtypeSpec) -> bool {
    match (declared, observed) {
        (
            DtypeSpec::Primitive { kind: dk, bits: db },
            DtypeSpec::Primitive { kind: ok, bits: ob },
        ) => dk == ok && db == ob,
        (DtypeSpec::Object, DtypeSpec::Object) => true,
        (
            DtypeSpec::Categorical { categories: expected },
            DtypeSpec::Categorical { categories: actual },
        ) => expected == actual,
        (DtypeSpec::DateTime { utc: d }, DtypeSpec::DateTime { utc: o }) => d == o,
        _ => false,
    }
}

impl fmt::Display for DtypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DtypeSpec::Primitive { kind, bits } => match kind {
                PrimitiveKind::Int => write!(f, "int{}", bits),
                PrimitiveKind::UInt => write!(f, "uint{}", bits),
                PrimitiveKind::Float => write!(f, "float{}", bits),
                PrimitiveKind::Bool => write!(f, "bool"),
            },
            DtypeSpec::Object => write!(f, "object"),
            DtypeSpec::Categorical { categories } => {
                write!(f, "category[{}]", categories.join(","))
            }
            DtypeSpec::DateTime { utc: false } => write!(f, "datetime64[ns]"),
            DtypeSpec::DateTime { utc: true } => write!(f, "datetime64[ns, UTC]"),
        }
    }
}

impl FromStr for DtypeSpec {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let lower = name.to_lowercase();

        let dtype = match lower.as_str() {
            "int8" => DtypeSpec::int8(),
            "int16" => DtypeSpec::int16(),
            "int32" => DtypeSpec::int32(),
            "int64" | "int" => DtypeSpec::int64(),
            "uint8" => DtypeSpec::uint8(),
            "uint16" => DtypeSpec::uint16(),
            "uint32" => DtypeSpec::uint32(),
            "uint64" => DtypeSpec::uint64(),
            "float32" => DtypeSpec::float32(),
            "float64" | "float" => DtypeSpec::float64(),
            "bool" | "boolean" => DtypeSpec::bool(),
            "object" | "str" | "string" | "list" | "dict" => DtypeSpec::Object,
            _ if DATETIME_PATTERN.is_match(&lower) => DtypeSpec::DateTime {
                utc: lower.contains("utc"),
            },
            _ => {
                // Labels keep their original case. The text form cannot carry
                // commas or surrounding spaces in a label; the JSON list form can.
                let caps = CATEGORY_PATTERN.captures(name).ok_or_else(|| {
                    SchemaError::Declaration(format!("unrecognized dtype '{}'", name))
                })?;
                let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let labels: Vec<&str> = if body.trim().is_empty() {
                    Vec::new()
                } else {
                    body.split(',').map(str::trim).collect()
                };
                if labels.iter().any(|label| label.is_empty()) {
                    return Err(SchemaError::Declaration(format!(
                        "empty category label in '{}'",
                        name
                    )));
                }
                DtypeSpec::categorical(labels)?
            }
        };

        Ok(dtype)
    }
}

impl Serialize for DtypeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DtypeSpec::Categorical { categories } => {
                let mut seq = serializer.serialize_seq(Some(categories.len()))?;
                for label in categories {
                    seq.serialize_element(label)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// A dtype is written either as its text name or as a list of category labels.
#[derive(Deserialize)]
#[serde(untagged)]
enum DtypeRepr {
    Name(String),
    Categories(Vec<String>),
}

impl<'de> Deserialize<'de> for DtypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match DtypeRepr::deserialize(deserializer)? {
            DtypeRepr::Name(name) => DtypeSpec::from_str(&name).map_err(de::Error::custom),
            DtypeRepr::Categories(labels) => {
                DtypeSpec::categorical(labels).map_err(de::Error::custom)
            }
        }
    }
}
