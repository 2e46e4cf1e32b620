//! Validation of tables against effective schemas.

mod validator;
mod violations;

pub use validator::validate;
pub use violations::{Diagnostic, IndexViolation, Mismatch, ValidationResult, Violations};
