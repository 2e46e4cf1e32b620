//! Structured validation diagnostics.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::dtype::DtypeSpec;
use crate::error::{Result, SchemaError};
use crate::schema::IndexDescriptor;

/// Expected vs observed dtype of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub expected: DtypeSpec,
    pub observed: DtypeSpec,
}

/// Index name or dtype did not match the declared index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexViolation {
    pub expected: IndexDescriptor,
    /// `None` when the index is unnamed.
    pub observed_name: Option<String>,
    pub observed_dtype: DtypeSpec,
}

/// Every way a table failed its schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations {
    /// Required columns absent from the table.
    pub missing_required: BTreeSet<String>,
    /// Present columns whose dtype does not match, in schema order.
    pub mismatched: IndexMap<String, Mismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_violation: Option<IndexViolation>,
}

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.missing_required.is_empty()
            && self.mismatched.is_empty()
            && self.index_violation.is_none()
    }

    /// Total number of individual violations.
    pub fn count(&self) -> usize {
        self.missing_required.len()
            + self.mismatched.len()
            + usize::from(self.index_violation.is_some())
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing_required.is_empty() {
            let missing: Vec<&str> = self.missing_required.iter().map(String::as_str).collect();
            writeln!(f, "Missing required columns: {}", missing.join(", "))?;
        }
        if !self.mismatched.is_empty() {
            writeln!(f, "Mismatched columns:")?;
            for (name, m) in &self.mismatched {
                writeln!(f, "  {}: expected {}, actual {}", name, m.expected, m.observed)?;
            }
        }
        if let Some(index) = &self.index_violation {
            writeln!(
                f,
                "Index: expected '{}' ({}), actual {} ({})",
                index.expected.name,
                index.expected.dtype,
                index
                    .observed_name
                    .as_deref()
                    .map(|n| format!("'{}'", n))
                    .unwrap_or_else(|| "<unnamed>".to_string()),
                index.observed_dtype
            )?;
        }
        Ok(())
    }
}

/// Violations together with the full expected and actual dtype mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub violations: Violations,
    /// All declared columns, required first.
    pub expected: IndexMap<String, DtypeSpec>,
    /// All columns of the table, in table order.
    pub actual: IndexMap<String, DtypeSpec>,
}

impl Diagnostic {
    /// Declared `(column, dtype)` pairs the table does not satisfy.
    pub fn difference(&self) -> Vec<(&str, &DtypeSpec)> {
        self.expected
            .iter()
            .filter(|(name, _)| {
                self.violations.missing_required.contains(*name)
                    || self.violations.mismatched.contains_key(*name)
            })
            .map(|(name, dtype)| (name.as_str(), dtype))
            .collect()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.violations)?;
        writeln!(f, "Actual: {}", render_mapping(&self.actual))?;
        write!(f, "Expected: {}", render_mapping(&self.expected))
    }
}

fn render_mapping(mapping: &IndexMap<String, DtypeSpec>) -> String {
    let entries: Vec<String> = mapping
        .iter()
        .map(|(name, dtype)| format!("{}: {}", name, dtype))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Outcome of validating a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "diagnostic", rename_all = "snake_case")]
pub enum ValidationResult {
    Conforms,
    Violated(Box<Diagnostic>),
}

impl ValidationResult {
    pub fn is_conforming(&self) -> bool {
        matches!(self, ValidationResult::Conforms)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ValidationResult::Conforms => None,
            ValidationResult::Violated(d) => Some(d),
        }
    }

    pub fn violations(&self) -> Option<&Violations> {
        self.diagnostic().map(|d| &d.violations)
    }

    /// Turn a failed validation into [`SchemaError::Violation`].
    pub fn into_result(self) -> Result<()> {
        match self {
            ValidationResult::Conforms => Ok(()),
            ValidationResult::Violated(d) => Err(SchemaError::Violation(d)),
        }
    }
}
