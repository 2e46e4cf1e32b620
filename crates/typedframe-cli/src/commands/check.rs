//! Check command - validate a data file against a table shape.

use std::path::PathBuf;

use colored::Colorize;
use typedframe::{validate, ValidationResult};

use crate::cli::ShapeArgs;

use super::{read_table, resolve_shape};

/// Returns the process exit code: 0 when the table conforms, 1 otherwise.
pub fn run(
    file: PathBuf,
    shape: ShapeArgs,
    index_col: Option<String>,
    json_output: bool,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let schema = resolve_shape(&shape)?;
    let table = read_table(&file, index_col.as_deref())?;

    let result = validate(&schema, &table);

    if json_output {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "shape": shape.shape,
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &result {
            ValidationResult::Conforms => {
                println!(
                    "{} {} conforms to {}",
                    "OK".green().bold(),
                    file.display().to_string().white(),
                    shape.shape.cyan()
                );
                if verbose {
                    println!("  Rows:    {}", table.row_count());
                    println!("  Columns: {}", table.column_count());
                }
            }
            ValidationResult::Violated(diagnostic) => {
                println!(
                    "{} {} does not conform to {} ({} violations)",
                    "FAIL".red().bold(),
                    file.display().to_string().white(),
                    shape.shape.cyan(),
                    diagnostic.violations.count().to_string().red()
                );
                println!();
                println!("{}", diagnostic);
                println!();
                println!(
                    "Run {} to attempt a repair.",
                    format!(
                        "typedframe convert {} --schema {} --shape {}",
                        file.display(),
                        shape.schema.display(),
                        shape.shape
                    )
                    .cyan()
                );
            }
        }
    }

    Ok(if result.is_conforming() { 0 } else { 1 })
}
