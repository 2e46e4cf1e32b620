//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Typedframe: check and convert tables against declared schemas
#[derive(Parser)]
#[command(name = "typedframe")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Which shape of which catalog to use.
#[derive(Args, Clone)]
pub struct ShapeArgs {
    /// Path to the JSON schema catalog
    #[arg(short, long, value_name = "CATALOG")]
    pub schema: PathBuf,

    /// Name of the table shape in the catalog
    #[arg(long, value_name = "NAME")]
    pub shape: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a data file against a table shape
    Check {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Column to use as the row index
        #[arg(long, value_name = "COLUMN")]
        index_col: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a data file to match a table shape
    Convert {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Column to use as the row index
        #[arg(long, value_name = "COLUMN")]
        index_col: Option<String>,

        /// Output path for converted data (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't add missing optional columns
        #[arg(long)]
        no_optional: bool,
    },

    /// Print the effective schema of a table shape
    Schema {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}
