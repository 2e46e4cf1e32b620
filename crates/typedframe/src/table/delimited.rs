//! CSV/TSV reading and writing with delimiter detection.

use std::fs;
use std::path::Path;

use crate::dtype::DtypeSpec;
use crate::error::{Result, SchemaError};

use super::frame::{Column, DataFrame};
use super::value::Value;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Loads delimited files into a [`DataFrame`].
///
/// Every column comes back as `object` holding text; NA-like tokens become
/// missing values. Conversion against a schema assigns real dtypes.
pub struct CsvReader {
    options: CsvOptions,
}

impl CsvReader {
    pub fn new() -> Self {
        Self {
            options: CsvOptions::default(),
        }
    }

    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Read a file from disk.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SchemaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.read_bytes(&contents)
    }

    /// Parse bytes directly.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<DataFrame> {
        let delimiter = match self.options.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes, self.options.quote)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.options.has_header)
            .quote(self.options.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.options.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.options.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if headers.is_empty() {
                // Generate column names from the first record.
                headers = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
                cells = vec![Vec::new(); headers.len()];
            }

            // Short rows are padded with nulls, long rows truncated.
            for (col_idx, column) in cells.iter_mut().enumerate() {
                let value = match record.get(col_idx) {
                    Some(raw) if !is_null_value(raw) => Value::Str(raw.to_string()),
                    _ => Value::Null,
                };
                column.push(value);
            }
        }

        if headers.is_empty() {
            return Err(SchemaError::EmptyData("No columns found".to_string()));
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, DtypeSpec::Object, values))
            .collect::<Result<Vec<_>>>()?;

        DataFrame::new(columns)
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a [`DataFrame`] as delimited text. Missing values become empty cells.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Write to a file, replacing it if it exists.
    pub fn write_path(&self, frame: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.write_bytes(frame)?;
        fs::write(path, bytes).map_err(|e| SchemaError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Render to bytes.
    pub fn write_bytes(&self, frame: &DataFrame) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(frame.columns().iter().map(Column::name))?;
        for row in 0..frame.row_count() {
            let record: Vec<String> = frame
                .columns()
                .iter()
                .map(|column| render_cell(column, row))
                .collect();
            writer.write_record(&record)?;
        }

        writer.into_inner().map_err(|e| SchemaError::Io {
            path: "<buffer>".into(),
            source: e.into_error(),
        })
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

fn render_cell(column: &Column, row: usize) -> String {
    match (column.get(row), column.dtype()) {
        (Some(Value::Timestamp(nanos)), DtypeSpec::DateTime { utc }) => {
            Value::format_timestamp(*nanos, *utc)
        }
        (Some(value), _) => value.to_string(),
        (None, _) => String::new(),
    }
}

/// Cell texts read as missing values, compared case-insensitively.
const NULL_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// Records sampled when detecting the delimiter.
const SNIFF_RECORDS: usize = 10;

/// Whether a cell's text stands for a missing value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Pick the candidate delimiter that splits the first records into the same,
/// largest number of fields. Quoting follows the reader's quote character.
fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    let mut best: Option<(bool, usize, u8)> = None;

    for &delim in DELIMITERS {
        let widths = sniff_field_counts(bytes, delim, quote);
        let Some(&first) = widths.first() else {
            continue;
        };
        if first < 2 {
            continue;
        }
        let consistent = widths.iter().all(|&w| w == first);
        // Earlier candidates win ties.
        if best.is_none_or(|(c, w, _)| (consistent, first) > (c, w)) {
            best = Some((consistent, first, delim));
        }
    }

    match best {
        Some((_, _, delim)) => Ok(delim),
        None if sniff_field_counts(bytes, b',', quote).is_empty() => {
            Err(SchemaError::EmptyData("No lines to analyze".to_string()))
        }
        None => Ok(b','),
    }
}

/// Field counts of the first non-blank records under `delimiter`.
fn sniff_field_counts(bytes: &[u8], delimiter: u8, quote: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes)
        .records()
        .filter_map(|record| record.ok())
        .filter(|record| record.iter().any(|field| !field.trim().is_empty()))
        .take(SNIFF_RECORDS)
        .map(|record| record.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TabularData;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;note\n\"Smith, J\";\"a, b, c\"\nLee;x";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b';');

        let single_quoted = b"a|b\n'x|y'|z";
        assert_eq!(detect_delimiter(single_quoted, b'\'').unwrap(), b'|');
    }

    #[test]
    fn test_detect_delimiter_single_column_and_empty() {
        assert_eq!(detect_delimiter(b"only\n1\n2", b'"').unwrap(), b',');
        assert!(matches!(
            detect_delimiter(b"\n\n", b'"'),
            Err(SchemaError::EmptyData(_))
        ));
    }

    #[test]
    fn test_null_tokens() {
        for token in ["", "  ", "NA", "n/a", "NaN", "null", "None"] {
            assert!(is_null_value(token), "{token:?} should be null");
        }
        assert!(!is_null_value("0"));
        assert!(!is_null_value("nothing"));
    }

    #[test]
    fn test_read_csv_as_object_columns() {
        let data = b"name,age,city\nAlice,30,NYC\nBob,NA,LA";
        let frame = CsvReader::new().read_bytes(data).unwrap();

        assert_eq!(frame.column_names(), vec!["name", "age", "city"]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.column_dtype("age"), Some(DtypeSpec::Object));
        assert_eq!(frame.get(0, "name"), Some(&Value::from("Alice")));
        assert_eq!(frame.get(1, "age"), Some(&Value::Null));
    }

    #[test]
    fn test_short_rows_padded() {
        let data = b"a,b,c\n1,2\n3,4,5";
        let frame = CsvReader::new().read_bytes(data).unwrap();
        assert_eq!(frame.get(0, "c"), Some(&Value::Null));
        assert_eq!(frame.get(1, "c"), Some(&Value::from("5")));
    }

    #[test]
    fn test_headerless_names_generated() {
        let options = CsvOptions {
            delimiter: Some(b','),
            has_header: false,
            ..CsvOptions::default()
        };
        let frame = CsvReader::with_options(options).read_bytes(b"1,2\n3,4").unwrap();
        assert_eq!(frame.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(frame.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let options = CsvOptions {
            max_rows: Some(1),
            ..CsvOptions::default()
        };
        let frame = CsvReader::with_options(options)
            .read_bytes(b"a,b\n1,2\n3,4\n5,6")
            .unwrap();
        assert_eq!(frame.row_count(), 1);
    }

    #[test]
    fn test_write_renders_nulls_and_timestamps() {
        let frame = DataFrame::new(vec![
            Column::new("n", DtypeSpec::int64(), [Value::Int(1), Value::Null]).unwrap(),
            Column::datetime_utc("ts", [0, 1_622_419_200_000_000_000]),
        ])
        .unwrap();
        let bytes = CsvWriter::default().write_bytes(&frame).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "n,ts\n1,1970-01-01T00:00:00Z\n,2021-05-31T00:00:00Z\n"
        );
    }

    #[test]
    fn test_is_null_value() {
        assert!(is_null_value(""));
        assert!(is_null_value("NA"));
        assert!(is_null_value("n/a"));
        assert!(is_null_value("NULL"));
        assert!(!is_null_value("value"));
        assert!(!is_null_value("0"));
    }
}
