//! Best-effort repair of a table so that it conforms to a schema.

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::EffectiveSchema;
use crate::table::TabularData;
use crate::validation::{validate, ValidationResult};

/// Configuration for conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Add declared optional columns that the table lacks, filled with nulls.
    pub add_optional_columns: bool,
    /// Cast and rename the row index to match a declared index.
    pub repair_index: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            add_optional_columns: true,
            repair_index: true,
        }
    }
}

/// Converts tables to match an effective schema.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Produce a conforming copy of `table`. The input is never modified.
    ///
    /// Fails with [`SchemaError::CastFailed`] when a column cannot be cast,
    /// or [`SchemaError::ConversionIncomplete`] when violations remain, such
    /// as a missing required column.
    pub fn convert<T: TabularData>(&self, schema: &EffectiveSchema, table: &T) -> Result<T> {
        let mut working = table.clone();

        if self.options.add_optional_columns {
            for (name, dtype) in schema.optional() {
                if !working.has_column(name) {
                    debug!("Adding missing optional column '{}' as {}", name, dtype);
                    working.add_null_column(name, dtype)?;
                }
            }
        }

        let present: Vec<String> = working
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        for name in &present {
            let Some(declared) = schema.dtype_of(name) else {
                continue;
            };
            let observed = working.column_dtype(name);
            if observed.is_some_and(|observed| !declared.matches(&observed)) {
                working.cast_column(name, declared)?;
            }
        }

        if self.options.repair_index {
            if let Some(index) = schema.index() {
                if !index.dtype.matches(&working.index_dtype()) {
                    debug!("Casting index to {}", index.dtype);
                    working.cast_index(&index.dtype)?;
                }
                if working.index_name() != Some(index.name.as_str()) {
                    working.set_index_name(Some(index.name.as_str()));
                }
            }
        }

        match validate(schema, &working) {
            ValidationResult::Conforms => Ok(working),
            ValidationResult::Violated(diagnostic) => {
                Err(SchemaError::ConversionIncomplete(diagnostic))
            }
        }
    }
}

/// Convert with default options.
pub fn convert<T: TabularData>(schema: &EffectiveSchema, table: &T) -> Result<T> {
    Converter::new().convert(schema, table)
}
