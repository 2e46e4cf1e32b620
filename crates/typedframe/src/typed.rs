//! Tables paired with the schema they were validated against.

use std::ops::Deref;
use std::sync::Arc;

use crate::convert::{ConvertOptions, Converter};
use crate::error::Result;
use crate::schema::EffectiveSchema;
use crate::table::TabularData;
use crate::validation::validate;

/// A table known to conform to `schema`.
///
/// Only built through [`TypedFrame::wrap`] or [`TypedFrame::convert`], so
/// holding one is proof the check passed. Dereferences to the table.
#[derive(Debug, Clone)]
pub struct TypedFrame<T> {
    table: T,
    schema: Arc<EffectiveSchema>,
}

impl<T: TabularData> TypedFrame<T> {
    /// Validate and wrap a table without copying it.
    ///
    /// Fails with [`crate::SchemaError::Violation`] carrying every violation.
    pub fn wrap(schema: Arc<EffectiveSchema>, table: T) -> Result<Self> {
        validate(&schema, &table).into_result()?;
        Ok(Self { table, schema })
    }

    /// Convert a copy of `table` with default options and wrap the result.
    pub fn convert(schema: Arc<EffectiveSchema>, table: &T) -> Result<Self> {
        Self::convert_with(schema, table, ConvertOptions::default())
    }

    /// Convert a copy of `table` and wrap the result.
    pub fn convert_with(
        schema: Arc<EffectiveSchema>,
        table: &T,
        options: ConvertOptions,
    ) -> Result<Self> {
        let table = Converter::with_options(options).convert(&schema, table)?;
        Ok(Self { table, schema })
    }
}

impl<T> TypedFrame<T> {
    pub fn table(&self) -> &T {
        &self.table
    }

    /// The effective schema this table was checked against.
    pub fn schema(&self) -> &Arc<EffectiveSchema> {
        &self.schema
    }

    /// Give up the schema guarantee and return the table.
    pub fn into_inner(self) -> T {
        self.table
    }
}

impl<T> Deref for TypedFrame<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.table
    }
}

impl<T> AsRef<T> for TypedFrame<T> {
    fn as_ref(&self) -> &T {
        &self.table
    }
}
