//! Error types for the typedframe library.

use std::path::PathBuf;
use thiserror::Error;

use crate::dtype::DtypeSpec;
use crate::validation::Diagnostic;

/// Main error type for typedframe operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Table failed validation and no conversion was attempted.
    #[error("Table doesn't match schema\n{0}")]
    Violation(Box<Diagnostic>),

    /// A column could not be cast to its declared dtype during conversion.
    #[error("Failed to convert column '{column}' from {from} to {to}: {reason}")]
    CastFailed {
        column: String,
        from: DtypeSpec,
        to: DtypeSpec,
        reason: String,
    },

    /// Conversion ran to completion but the table still violates the schema.
    #[error("Conversion left table non-conforming\n{0}")]
    ConversionIncomplete(Box<Diagnostic>),

    /// Malformed schema declaration, caught at definition time.
    #[error("Invalid schema declaration: {0}")]
    Declaration(String),

    /// A value does not fit the dtype of the column it was placed in.
    #[error("Value '{value}' does not fit column '{column}' of dtype {dtype}")]
    ValueMismatch {
        column: String,
        dtype: DtypeSpec,
        value: String,
    },

    /// Table construction failed (ragged columns, duplicate names).
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A table operation referenced a column that does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl SchemaError {
    /// True for a plain validation failure (no conversion attempted).
    pub fn is_violation(&self) -> bool {
        matches!(self, SchemaError::Violation(_))
    }

    /// True when a conversion was attempted and failed.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            SchemaError::CastFailed { .. } | SchemaError::ConversionIncomplete(_)
        )
    }

    /// The structured diagnostic carried by validation-style failures.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            SchemaError::Violation(d) | SchemaError::ConversionIncomplete(d) => Some(d),
            _ => None,
        }
    }
}

/// Result type alias for typedframe operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
