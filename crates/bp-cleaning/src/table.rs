//! The in-memory table the cleaning stage transforms.
//!
//! A thin wrapper over a polars [`DataFrame`] that tags every column with a
//! [`ColumnKind`]. Missing cells are polars nulls. Columns are only ever
//! replaced wholesale with a vector of the table's height, so the equal-length
//! invariant holds by construction; rows are removed through
//! [`Table::retain_rows`] alone.

use crate::error::{CleaningError, Result};
use crate::types::ColumnKind;
use crate::utils::{column_names, series_to_f64, series_to_strings};
use polars::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: HashMap<String, ColumnKind>,
    identifier: Option<String>,
}

impl Table {
    /// Wrap a freshly loaded frame. Every column starts out categorical.
    pub fn new(df: DataFrame) -> Self {
        let kinds = column_names(&df)
            .into_iter()
            .map(|name| (name, ColumnKind::Categorical))
            .collect();
        Self {
            df,
            kinds,
            identifier: None,
        }
    }

    /// Mark `name` as the identifier column.
    pub fn with_identifier(mut self, name: Option<String>) -> Self {
        if let Some(ref id) = name {
            self.kinds.insert(id.clone(), ColumnKind::Identifier);
        }
        self.identifier = name;
        self
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.df)
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    /// Columns of one kind, in frame order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kind(name) == Some(kind))
            .collect()
    }

    /// Borrow a column as a series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.df
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// Column values as optional floats; unparseable cells read as `None`.
    pub fn values_f64(&self, name: &str) -> Result<Vec<Option<f64>>> {
        Ok(series_to_f64(self.series(name)?)?)
    }

    /// Column values as optional strings.
    pub fn values_str(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(series_to_strings(self.series(name)?)?)
    }

    /// Store `values` as a Float64 column and tag it numeric.
    pub fn set_numeric(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.check_len(name, values.len())?;
        self.put(Series::new(name.into(), values))?;
        self.kinds.insert(name.to_string(), ColumnKind::Numeric);
        Ok(())
    }

    /// Store `values` as a String column and tag it categorical.
    pub fn set_categorical(&mut self, name: &str, values: Vec<Option<String>>) -> Result<()> {
        self.check_len(name, values.len())?;
        self.put(Series::new(name.into(), values))?;
        self.kinds.insert(name.to_string(), ColumnKind::Categorical);
        Ok(())
    }

    /// Store `values` as an Int32 0/1 column and tag it as a flag.
    pub fn set_flag(&mut self, name: &str, values: Vec<i32>) -> Result<()> {
        self.check_len(name, values.len())?;
        self.put(Series::new(name.into(), values))?;
        self.kinds.insert(name.to_string(), ColumnKind::Flag);
        Ok(())
    }

    /// Overwrite a column with a series of the same height, keeping its kind.
    pub fn restore_column(&mut self, series: Series) -> Result<()> {
        let name = series.name().to_string();
        if !self.has_column(&name) {
            return Err(CleaningError::ColumnNotFound(name));
        }
        self.check_len(&name, series.len())?;
        self.df.replace(&name, series)?;
        Ok(())
    }

    /// Remove a column entirely.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        self.df
            .drop_in_place(name)
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))?;
        self.kinds.remove(name);
        if self.identifier.as_deref() == Some(name) {
            self.identifier = None;
        }
        Ok(())
    }

    /// Keep the rows where `mask` is true, preserving their order.
    pub fn retain_rows(&mut self, mask: &BooleanChunked) -> Result<()> {
        self.check_len("<row mask>", mask.len())?;
        self.df = self.df.filter(mask)?;
        Ok(())
    }

    fn put(&mut self, series: Series) -> Result<()> {
        let name = series.name().to_string();
        if self.has_column(&name) {
            self.df.replace(&name, series)?;
        } else {
            self.df.with_column(series)?;
        }
        Ok(())
    }

    fn check_len(&self, column: &str, actual: usize) -> Result<()> {
        if self.width() > 0 && actual != self.height() {
            return Err(CleaningError::LengthMismatch {
                column: column.to_string(),
                expected: self.height(),
                actual,
            });
        }
        Ok(())
    }
}
