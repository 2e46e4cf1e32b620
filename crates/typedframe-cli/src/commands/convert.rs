//! Convert command - repair a data file so it matches a table shape.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use typedframe::{ConvertOptions, Converter, CsvWriter};

use crate::cli::ShapeArgs;

use super::{read_table, resolve_shape};

pub fn run(
    file: PathBuf,
    shape: ShapeArgs,
    index_col: Option<String>,
    output: Option<PathBuf>,
    no_optional: bool,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let schema = resolve_shape(&shape)?;
    let table = read_table(&file, index_col.as_deref())?;

    let converter = Converter::with_options(ConvertOptions {
        add_optional_columns: !no_optional,
        ..ConvertOptions::default()
    });
    let converted = converter.convert(&schema, &table)?.reset_index()?;

    let delimiter = output
        .as_deref()
        .map(delimiter_for)
        .unwrap_or_else(|| delimiter_for(&file));
    let writer = CsvWriter::new(delimiter);

    match output {
        Some(path) => {
            writer.write_path(&converted, &path)?;
            eprintln!(
                "{} {} to {}",
                "Converted".green().bold(),
                file.display().to_string().white(),
                path.display().to_string().cyan()
            );
            if verbose {
                eprintln!("  Rows:    {}", converted.row_count());
                eprintln!("  Columns: {}", converted.column_count());
            }
        }
        None => {
            let bytes = writer.write_bytes(&converted)?;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(0)
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{catalog, write};

    const EVENTS: &str = "event_id,at\n1,2021-05-31\n2,2021-06-01 12:30:00\n";

    #[test]
    fn test_convert_writes_conforming_file() {
        let (dir, shape) = catalog("Events");
        let file = write(&dir, "events.csv", EVENTS);
        let out = dir.path().join("out.csv");

        assert_eq!(run(file, shape.clone(), None, Some(out.clone()), false, false).unwrap(), 0);
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "event_id,at,comment\n1,2021-05-31T00:00:00,\n2,2021-06-01T12:30:00,\n"
        );

        // Re-read as text, the written file no longer carries the cast dtypes.
        assert_eq!(crate::commands::check::run(out, shape, None, false, false).unwrap(), 1);
    }

    #[test]
    fn test_no_optional_skips_missing_columns() {
        let (dir, shape) = catalog("Events");
        let file = write(&dir, "events.csv", EVENTS);
        let out = dir.path().join("out.tsv");

        run(file, shape, None, Some(out.clone()), true, false).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("event_id\tat\n"));
        assert!(!written.contains("comment"));
    }

    #[test]
    fn test_index_written_back_as_leading_column() {
        let (dir, shape) = catalog("DailyEvents");
        let file = write(
            &dir,
            "daily.csv",
            "event_id,day,at\n1,2021-05-31,2021-05-31 08:00:00\n",
        );
        let out = dir.path().join("out.csv");

        run(file, shape, Some("day".to_string()), Some(out.clone()), false, false).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "day,event_id,at,comment\n2021-05-31T00:00:00,1,2021-05-31T08:00:00,\n"
        );
    }

    #[test]
    fn test_cast_failure_is_an_error() {
        let (dir, shape) = catalog("Events");
        let file = write(&dir, "events.csv", "event_id,at\none,2021-05-31\n");
        let out = dir.path().join("out.csv");

        let err = run(file, shape, None, Some(out.clone()), false, false).unwrap_err();
        assert!(err.to_string().contains("event_id"));
        assert!(!out.exists());
    }

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(delimiter_for(Path::new("out.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("out.TSV")), b'\t');
        assert_eq!(delimiter_for(Path::new("out.csv")), b',');
        assert_eq!(delimiter_for(Path::new("out")), b',');
    }
}
