//! Tabular data: the host-table boundary and an in-memory implementation.

mod cast;
mod delimited;
mod frame;
mod value;

use indexmap::IndexMap;

use crate::dtype::DtypeSpec;
use crate::error::Result;

pub use delimited::{CsvOptions, CsvReader, CsvWriter};
pub use cast::{cast_value, parse_bool, parse_timestamp};
pub use frame::{Column, DataFrame, Index};
pub use value::Value;

/// What validation and conversion need from a table engine.
///
/// Conversion works on a clone, so `Clone` must produce an independent
/// working copy; the caller's table is never modified.
pub trait TabularData: Clone {
    /// Column names in table order.
    fn column_names(&self) -> Vec<&str>;

    /// Dtype of a column, `None` if absent.
    fn column_dtype(&self, name: &str) -> Option<DtypeSpec>;

    /// Name of the row index; `None` for an unnamed index.
    fn index_name(&self) -> Option<&str>;

    /// Dtype of the row index.
    fn index_dtype(&self) -> DtypeSpec;

    /// Append a column of `dtype` filled entirely with missing values.
    fn add_null_column(&mut self, name: &str, dtype: &DtypeSpec) -> Result<()>;

    /// Cast an existing column to `dtype`.
    fn cast_column(&mut self, name: &str, dtype: &DtypeSpec) -> Result<()>;

    /// Cast the row index to `dtype`.
    fn cast_index(&mut self, dtype: &DtypeSpec) -> Result<()>;

    /// Rename the row index.
    fn set_index_name(&mut self, name: Option<&str>);

    fn has_column(&self, name: &str) -> bool {
        self.column_dtype(name).is_some()
    }

    /// All column dtypes in table order.
    fn dtypes(&self) -> IndexMap<String, DtypeSpec> {
        self.column_names()
            .into_iter()
            .filter_map(|name| {
                self.column_dtype(name)
                    .map(|dtype| (name.to_string(), dtype))
            })
            .collect()
    }
}
