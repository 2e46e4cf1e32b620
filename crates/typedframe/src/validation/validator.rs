//! Checking a table against an effective schema.

use tracing::debug;

use crate::schema::EffectiveSchema;
use crate::table::TabularData;

use super::violations::{Diagnostic, IndexViolation, Mismatch, ValidationResult, Violations};

/// Validate `table` against `schema`, collecting every violation.
///
/// Columns the schema does not mention are ignored: a schema is a lower
/// bound on the table, not an exact description of it.
pub fn validate<T: TabularData>(schema: &EffectiveSchema, table: &T) -> ValidationResult {
    let mut violations = Violations::default();

    for (name, expected) in schema.required() {
        match table.column_dtype(name) {
            None => {
                violations.missing_required.insert(name.clone());
            }
            Some(observed) if !expected.matches(&observed) => {
                violations.mismatched.insert(
                    name.clone(),
                    Mismatch {
                        expected: expected.clone(),
                        observed,
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (name, expected) in schema.optional() {
        if let Some(observed) = table.column_dtype(name) {
            if !expected.matches(&observed) {
                violations.mismatched.insert(
                    name.clone(),
                    Mismatch {
                        expected: expected.clone(),
                        observed,
                    },
                );
            }
        }
    }

    if let Some(expected) = schema.index() {
        let observed_name = table.index_name();
        let observed_dtype = table.index_dtype();
        if observed_name != Some(expected.name.as_str()) || !expected.dtype.matches(&observed_dtype)
        {
            violations.index_violation = Some(IndexViolation {
                expected: expected.clone(),
                observed_name: observed_name.map(str::to_string),
                observed_dtype,
            });
        }
    }

    if violations.is_empty() {
        return ValidationResult::Conforms;
    }

    debug!("Table failed validation with {} violations", violations.count());

    ValidationResult::Violated(Box::new(Diagnostic {
        violations,
        expected: schema.dtypes(true),
        actual: table.dtypes(),
    }))
}
