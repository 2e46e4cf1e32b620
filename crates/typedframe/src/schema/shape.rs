//! Table-shape definitions that can live in statics.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::convert::ConvertOptions;
use crate::error::Result;
use crate::table::TabularData;
use crate::typed::TypedFrame;
use crate::validation::{validate, ValidationResult};

use super::compose::{compose, EffectiveSchema};
use super::descriptor::SchemaDescriptor;

/// A named table shape with its own declaration and ordered parents.
///
/// The effective schema is composed on first use and then shared; parallel
/// first uses block until the single computation is published. Parents must
/// not (transitively) include the shape itself.
///
/// ```
/// use typedframe::{DtypeSpec, SchemaDescriptor, TableShape};
///
/// static ROOT: TableShape = TableShape::new("Root", || {
///     SchemaDescriptor::builder()
///         .required("root", DtypeSpec::bool())
///         .build()
/// }, &[]);
///
/// static LEAF: TableShape = TableShape::new("Leaf", || {
///     SchemaDescriptor::builder()
///         .optional("leaf", DtypeSpec::int64())
///         .build()
/// }, &[&ROOT]);
///
/// let schema = LEAF.schema().unwrap();
/// assert!(schema.is_required("root"));
/// ```
pub struct TableShape {
    name: &'static str,
    declare: fn() -> Result<SchemaDescriptor>,
    parents: &'static [&'static TableShape],
    effective: OnceCell<Arc<EffectiveSchema>>,
}

impl TableShape {
    pub const fn new(
        name: &'static str,
        declare: fn() -> Result<SchemaDescriptor>,
        parents: &'static [&'static TableShape],
    ) -> Self {
        Self {
            name,
            declare,
            parents,
            effective: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parents(&self) -> &'static [&'static TableShape] {
        self.parents
    }

    /// The effective schema, composed once.
    ///
    /// A malformed declaration anywhere in the ancestry is reported here,
    /// before any table is checked.
    pub fn schema(&self) -> Result<Arc<EffectiveSchema>> {
        self.effective
            .get_or_try_init(|| {
                let resolved = self
                    .parents
                    .iter()
                    .map(|parent| parent.schema())
                    .collect::<Result<Vec<_>>>()?;
                let parents: Vec<&EffectiveSchema> = resolved.iter().map(Arc::as_ref).collect();
                let declaration = (self.declare)()?;
                compose(&declaration, &parents).map(Arc::new)
            })
            .cloned()
    }

    /// Validate a table against this shape.
    pub fn validate<T: TabularData>(&self, table: &T) -> Result<ValidationResult> {
        let schema = self.schema()?;
        Ok(validate(&schema, table))
    }

    /// Validate and wrap a table.
    pub fn wrap<T: TabularData>(&self, table: T) -> Result<TypedFrame<T>> {
        TypedFrame::wrap(self.schema()?, table)
    }

    /// Convert a copy of a table and wrap it.
    pub fn convert<T: TabularData>(&self, table: &T) -> Result<TypedFrame<T>> {
        TypedFrame::convert(self.schema()?, table)
    }

    /// Convert with explicit options.
    pub fn convert_with<T: TabularData>(
        &self,
        table: &T,
        options: ConvertOptions,
    ) -> Result<TypedFrame<T>> {
        TypedFrame::convert_with(self.schema()?, table, options)
    }
}

impl std::fmt::Debug for TableShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableShape")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .field("resolved", &self.effective.get().is_some())
            .finish()
    }
}
