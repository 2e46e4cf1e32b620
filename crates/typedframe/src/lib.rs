//! Typedframe: declarative schemas for tables.
//!
//! A table shape declares required columns, optional columns and a row
//! index, each with a dtype. Shapes inherit from ordered parents and resolve
//! into one effective schema, which is then used to validate tables or to
//! convert them into conforming copies.
//!
//! # Core Principles
//!
//! - **Lower bound**: columns a schema does not mention are ignored
//! - **Non-destructive**: conversion always works on a copy
//! - **Complete reports**: validation lists every violation, not the first
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use typedframe::{Column, DataFrame, DtypeSpec, EffectiveSchema, SchemaDescriptor, TypedFrame};
//!
//! let declaration = SchemaDescriptor::builder()
//!     .required("id", DtypeSpec::int64())
//!     .optional("note", DtypeSpec::Object)
//!     .build()
//!     .unwrap();
//! let schema = Arc::new(EffectiveSchema::from_declaration(&declaration).unwrap());
//!
//! let raw = DataFrame::new(vec![Column::strings("id", ["1", "2"])]).unwrap();
//! assert!(TypedFrame::wrap(schema.clone(), raw.clone()).is_err());
//!
//! let typed = TypedFrame::convert(schema, &raw).unwrap();
//! assert_eq!(typed.column("note").unwrap().null_count(), 2);
//! ```

pub mod convert;
pub mod dtype;
pub mod error;
pub mod schema;
pub mod table;
pub mod typed;
pub mod validation;

pub use convert::{convert, ConvertOptions, Converter};
pub use dtype::{matches, DtypeSpec, PrimitiveKind};
pub use error::{Result, SchemaError};
pub use schema::{
    compose, ColumnSchema, EffectiveSchema, IndexDescriptor, SchemaBuilder, SchemaCatalog,
    SchemaDescriptor, ShapeDeclaration, TableShape,
};
pub use table::{Column, CsvOptions, CsvReader, CsvWriter, DataFrame, Index, TabularData, Value};
pub use typed::TypedFrame;
pub use validation::{
    validate, Diagnostic, IndexViolation, Mismatch, ValidationResult, Violations,
};
