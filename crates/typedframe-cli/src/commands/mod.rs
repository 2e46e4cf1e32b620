//! CLI command implementations.

pub mod check;
pub mod convert;
pub mod schema;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use typedframe::{CsvReader, DataFrame, EffectiveSchema, SchemaCatalog};

use crate::cli::ShapeArgs;

/// Load the catalog and resolve the requested shape.
pub(crate) fn resolve_shape(
    args: &ShapeArgs,
) -> Result<Arc<EffectiveSchema>, Box<dyn std::error::Error>> {
    if !args.schema.exists() {
        return Err(format!("Schema catalog not found: {}", args.schema.display()).into());
    }
    let catalog = SchemaCatalog::load(&args.schema)?;
    if !catalog.contains(&args.shape) {
        let known: Vec<&str> = catalog.names().collect();
        return Err(format!(
            "Shape '{}' not found in {}. Known shapes: {}",
            args.shape,
            args.schema.display(),
            known.join(", ")
        )
        .into());
    }
    let schema = catalog.resolve(&args.shape)?;
    debug!(
        "Resolved shape '{}': {} required, {} optional columns",
        args.shape,
        schema.required().len(),
        schema.optional().len()
    );
    Ok(schema)
}

/// Read a delimited file, optionally moving a column into the index.
pub(crate) fn read_table(
    file: &Path,
    index_col: Option<&str>,
) -> Result<DataFrame, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Data file not found: {}", file.display()).into());
    }
    let table = CsvReader::new().read_path(file)?;
    Ok(match index_col {
        Some(column) => table.set_index(column)?,
        None => table,
    })
}
