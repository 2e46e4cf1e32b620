//! Schema command - print the effective schema of a table shape.

use crate::cli::ShapeArgs;

use super::resolve_shape;

pub fn run(shape: ShapeArgs, _verbose: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let schema = resolve_shape(&shape)?;
    println!("{}", serde_json::to_string_pretty(schema.as_ref())?);
    Ok(0)
}
