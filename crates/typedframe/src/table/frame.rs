//! In-memory columnar table.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dtype::DtypeSpec;
use crate::error::{Result, SchemaError};

use super::cast::cast_value;
use super::value::Value;
use super::TabularData;

/// A named, homogeneously typed sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DtypeSpec,
    values: Vec<Value>,
}

impl Column {
    /// Create a column, checking every value fits `dtype`.
    pub fn new<I, V>(name: impl Into<String>, dtype: DtypeSpec, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        dtype.check()?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if let Some(bad) = values.iter().find(|v| !v.fits(&dtype)) {
            return Err(SchemaError::ValueMismatch {
                column: name,
                dtype,
                value: format!("{:?}", bad),
            });
        }
        Ok(Self {
            name,
            dtype,
            values,
        })
    }

    /// A column of `len` missing values.
    pub fn nulls(name: impl Into<String>, dtype: DtypeSpec, len: usize) -> Self {
        Self {
            name: name.into(),
            dtype,
            values: vec![Value::Null; len],
        }
    }

    pub fn int16(name: impl Into<String>, values: impl IntoIterator<Item = i16>) -> Self {
        Self::typed(name, DtypeSpec::int16(), values)
    }

    pub fn int32(name: impl Into<String>, values: impl IntoIterator<Item = i32>) -> Self {
        Self::typed(name, DtypeSpec::int32(), values)
    }

    pub fn int64(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::typed(name, DtypeSpec::int64(), values)
    }

    pub fn float64(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::typed(name, DtypeSpec::float64(), values)
    }

    pub fn bool(name: impl Into<String>, values: impl IntoIterator<Item = bool>) -> Self {
        Self::typed(name, DtypeSpec::bool(), values)
    }

    /// Text column, stored as `object`.
    pub fn strings<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::typed(name, DtypeSpec::Object, values.into_iter().map(Into::into))
    }

    /// Naive timestamps given as nanoseconds since the epoch.
    pub fn datetime(name: impl Into<String>, nanos: impl IntoIterator<Item = i64>) -> Self {
        Self::typed(
            name,
            DtypeSpec::datetime(),
            nanos.into_iter().map(Value::Timestamp),
        )
    }

    /// UTC timestamps given as nanoseconds since the epoch.
    pub fn datetime_utc(name: impl Into<String>, nanos: impl IntoIterator<Item = i64>) -> Self {
        Self::typed(
            name,
            DtypeSpec::datetime_utc(),
            nanos.into_iter().map(Value::Timestamp),
        )
    }

    /// Categorical column; every value must be one of `categories`.
    pub fn categorical<C, S>(
        name: impl Into<String>,
        categories: C,
        values: impl IntoIterator<Item = S>,
    ) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        S: Into<String>,
    {
        let dtype = DtypeSpec::categorical(categories)?;
        Self::new(name, dtype, values.into_iter().map(|v| Value::Str(v.into())))
    }

    fn typed<V: Into<Value>>(
        name: impl Into<String>,
        dtype: DtypeSpec,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> &DtypeSpec {
        &self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    fn cast(&mut self, dtype: &DtypeSpec) -> Result<()> {
        let values = cast_values(&self.values, dtype).map_err(|reason| SchemaError::CastFailed {
            column: self.name.clone(),
            from: self.dtype.clone(),
            to: dtype.clone(),
            reason,
        })?;
        self.values = values;
        self.dtype = dtype.clone();
        Ok(())
    }
}

/// Row labels of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    name: Option<String>,
    dtype: DtypeSpec,
    values: Vec<Value>,
}

impl Index {
    /// Unnamed `int64` index `0..len`.
    pub fn range(len: usize) -> Self {
        Self {
            name: None,
            dtype: DtypeSpec::int64(),
            values: (0..len as i64).map(Value::Int).collect(),
        }
    }

    /// Build an index from explicit labels.
    pub fn new<I, V>(name: Option<&str>, dtype: DtypeSpec, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let label = name.unwrap_or("index").to_string();
        let column = Column::new(label, dtype, values)?;
        Ok(Self {
            name: name.map(str::to_string),
            dtype: column.dtype,
            values: column.values,
        })
    }

    /// Same labels under a new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dtype(&self) -> &DtypeSpec {
        &self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered named columns of equal length plus a row index.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
    index: Index,
}

impl DataFrame {
    /// Build a frame with a default range index.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = BTreeSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::InvalidTable(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            if column.len() != rows {
                return Err(SchemaError::InvalidTable(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    rows
                )));
            }
        }

        Ok(Self {
            columns,
            index: Index::range(rows),
        })
    }

    /// An empty frame with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: Index::range(0),
        }
    }

    /// Replace the row index.
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.row_count() {
            return Err(SchemaError::InvalidTable(format!(
                "index has {} rows, expected {}",
                index.len(),
                self.row_count()
            )));
        }
        self.index = index;
        Ok(self)
    }

    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .map(Column::len)
            .unwrap_or_else(|| self.index.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Move a column into the row index, named after the column.
    pub fn set_index(mut self, column: &str) -> Result<Self> {
        let position = self
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| SchemaError::UnknownColumn(column.to_string()))?;
        let column = self.columns.remove(position);
        self.index = Index {
            name: Some(column.name),
            dtype: column.dtype,
            values: column.values,
        };
        Ok(self)
    }

    /// Move a named index back to the front as a column; the index becomes a
    /// default range. An unnamed index is dropped.
    pub fn reset_index(mut self) -> Result<Self> {
        let rows = self.row_count();
        let index = std::mem::replace(&mut self.index, Index::range(rows));
        if let Some(name) = index.name {
            if self.column(&name).is_some() {
                return Err(SchemaError::InvalidTable(format!(
                    "index '{}' collides with a column of the same name",
                    name
                )));
            }
            self.columns.insert(
                0,
                Column {
                    name,
                    dtype: index.dtype,
                    values: index.values,
                },
            );
        }
        Ok(self)
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))
    }
}

impl TabularData for DataFrame {
    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    fn column_dtype(&self, name: &str) -> Option<DtypeSpec> {
        self.column(name).map(|c| c.dtype.clone())
    }

    fn index_name(&self) -> Option<&str> {
        self.index.name()
    }

    fn index_dtype(&self) -> DtypeSpec {
        self.index.dtype.clone()
    }

    fn add_null_column(&mut self, name: &str, dtype: &DtypeSpec) -> Result<()> {
        if self.column(name).is_some() {
            return Err(SchemaError::InvalidTable(format!(
                "column '{}' already exists",
                name
            )));
        }
        dtype.check()?;
        let rows = self.row_count();
        self.columns.push(Column::nulls(name, dtype.clone(), rows));
        Ok(())
    }

    fn cast_column(&mut self, name: &str, dtype: &DtypeSpec) -> Result<()> {
        let column = self.column_mut(name)?;
        debug!("Casting column '{}' from {} to {}", name, column.dtype, dtype);
        column.cast(dtype)
    }

    fn cast_index(&mut self, dtype: &DtypeSpec) -> Result<()> {
        let values = cast_values(&self.index.values, dtype).map_err(|reason| {
            SchemaError::CastFailed {
                column: format!("index '{}'", self.index.name().unwrap_or("<unnamed>")),
                from: self.index.dtype.clone(),
                to: dtype.clone(),
                reason,
            }
        })?;
        self.index.values = values;
        self.index.dtype = dtype.clone();
        Ok(())
    }

    fn set_index_name(&mut self, name: Option<&str>) {
        self.index.name = name.map(str::to_string);
    }
}

/// Cast every value, reporting all failures in one reason string.
fn cast_values(values: &[Value], dtype: &DtypeSpec) -> std::result::Result<Vec<Value>, String> {
    let mut out = Vec::with_capacity(values.len());
    let mut failures = Vec::new();

    for (row, value) in values.iter().enumerate() {
        match cast_value(value, dtype) {
            Ok(v) => out.push(v),
            Err(reason) => failures.push((row, value, reason)),
        }
    }

    let Some((row, _, first)) = failures.first() else {
        return Ok(out);
    };

    if let DtypeSpec::Categorical { .. } = dtype {
        let unknown: BTreeSet<String> = failures.iter().map(|(_, v, _)| v.to_string()).collect();
        let unknown: Vec<String> = unknown.into_iter().collect();
        return Err(format!("unknown categories: {}", unknown.join(", ")));
    }

    if failures.len() == 1 {
        Err(format!("{} (row {})", first, row))
    } else {
        Err(format!(
            "{} (row {}) and {} more values",
            first,
            row,
            failures.len() - 1
        ))
    }
}
