//! Schema declarations, composition, and named table shapes.

mod catalog;
mod compose;
mod descriptor;
mod shape;

pub use catalog::{SchemaCatalog, ShapeDeclaration};
pub use compose::{compose, EffectiveSchema};
pub use descriptor::{ColumnSchema, IndexDescriptor, SchemaBuilder, SchemaDescriptor};
pub use shape::TableShape;
