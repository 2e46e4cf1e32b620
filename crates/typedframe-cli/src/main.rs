//! Typedframe CLI - schema checks and conversion for delimited files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "typedframe=debug"
    } else {
        "typedframe=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            file,
            shape,
            index_col,
            json,
        } => commands::check::run(file, shape, index_col, json, cli.verbose),

        Commands::Convert {
            file,
            shape,
            index_col,
            output,
            no_optional,
        } => commands::convert::run(file, shape, index_col, output, no_optional, cli.verbose),

        Commands::Schema { shape } => commands::schema::run(shape, cli.verbose),
    };

    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    std::process::exit(exit_code(&result));
}

/// Commands report their own status code; any error exits with 2.
fn exit_code(result: &Result<i32, Box<dyn std::error::Error>>) -> i32 {
    match result {
        Ok(code) => *code,
        Err(_) => 2,
    }
}
