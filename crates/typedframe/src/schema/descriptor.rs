//! Declared table shape: required columns, optional columns and index.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dtype::DtypeSpec;
use crate::error::{Result, SchemaError};

/// Ordered mapping from column name to declared dtype.
pub type ColumnSchema = IndexMap<String, DtypeSpec>;

/// Constraint on the table's row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDescriptor {
    /// Required index name.
    pub name: String,
    /// Required index dtype.
    pub dtype: DtypeSpec,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, dtype: DtypeSpec) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// One declared table shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDescriptor {
    /// Columns that must be present.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub required: ColumnSchema,
    /// Columns validated only when present.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional: ColumnSchema,
    /// Index constraint; `None` leaves the index unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexDescriptor>,
}

impl SchemaDescriptor {
    /// An empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a declaration.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Check that the declaration is well formed.
    ///
    /// Rejects empty names, malformed dtypes, and a column listed as both
    /// required and optional in the same declaration.
    pub fn check(&self) -> Result<()> {
        for (name, dtype) in self.required.iter().chain(self.optional.iter()) {
            if name.trim().is_empty() {
                return Err(SchemaError::Declaration(
                    "column names must not be empty".to_string(),
                ));
            }
            dtype.check()?;
        }

        if let Some(both) = self.required.keys().find(|k| self.optional.contains_key(*k)) {
            return Err(SchemaError::Declaration(format!(
                "column '{}' is declared both required and optional",
                both
            )));
        }

        if let Some(index) = &self.index {
            if index.name.trim().is_empty() {
                return Err(SchemaError::Declaration(
                    "index name must not be empty".to_string(),
                ));
            }
            index.dtype.check()?;
        }

        Ok(())
    }

    /// True when nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty() && self.index.is_none()
    }
}

/// Builder for [`SchemaDescriptor`].
///
/// Errors are deferred to [`SchemaBuilder::build`] so declarations read as a
/// single chain.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    descriptor: SchemaDescriptor,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Declare a required column.
    pub fn required(mut self, name: impl Into<String>, dtype: DtypeSpec) -> Self {
        let name = name.into();
        if self.descriptor.required.contains_key(&name) {
            self.fail(format!("required column '{}' declared twice", name));
        }
        self.descriptor.required.insert(name, dtype);
        self
    }

    /// Declare an optional column.
    pub fn optional(mut self, name: impl Into<String>, dtype: DtypeSpec) -> Self {
        let name = name.into();
        if self.descriptor.optional.contains_key(&name) {
            self.fail(format!("optional column '{}' declared twice", name));
        }
        self.descriptor.optional.insert(name, dtype);
        self
    }

    /// Constrain the row index.
    pub fn index(mut self, name: impl Into<String>, dtype: DtypeSpec) -> Self {
        self.descriptor.index = Some(IndexDescriptor::new(name, dtype));
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> Result<SchemaDescriptor> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.descriptor.check()?;
        Ok(self.descriptor)
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(SchemaError::Declaration(message));
        }
    }
}
