//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Removing exact duplicate rows
//! - Guarding the identifier column against transformation drift
//! - Range sanitization of physiological measurements
//! - Numeric type coercion

mod sanitizers;
mod type_corrector;

pub use sanitizers::RangeSanitizer;
pub use type_corrector::NumericCoercer;

use crate::error::Result;
use crate::table::Table;
use polars::prelude::*;
use tracing::{debug, info};

/// Temporary column numbering the rows while duplicates are resolved.
const ROW_INDEX: &str = "__row_index";

/// Exact duplicate row removal.
pub struct DuplicateRemover;

impl DuplicateRemover {
    /// Mask that keeps the first occurrence of every distinct row.
    ///
    /// Rows compare equal when every cell is equal; two missing cells are
    /// equal to each other.
    pub fn keep_mask(table: &Table) -> Result<BooleanChunked> {
        let data_columns = table.column_names();
        let unique = table
            .frame()
            .with_row_index(ROW_INDEX.into(), None)?
            .unique_stable(Some(data_columns.as_slice()), UniqueKeepStrategy::First, None)?;

        let mut keep = vec![false; table.height()];
        let kept = unique.column(ROW_INDEX)?.as_materialized_series().idx()?;
        for idx in kept.into_no_null_iter() {
            keep[idx as usize] = true;
        }

        Ok(BooleanChunked::from_slice("keep".into(), &keep))
    }

    /// Drop exact duplicates in place, first occurrence wins.
    ///
    /// Returns the mask that was applied, so row-aligned side data can follow,
    /// and the number of rows removed.
    pub fn remove(table: &mut Table) -> Result<(BooleanChunked, usize)> {
        let before = table.height();
        let mask = Self::keep_mask(table)?;
        let kept = mask.into_iter().filter(|k| *k == Some(true)).count();
        let duplicates = before - kept;

        info!("Exact duplicates: {}", duplicates);
        if duplicates > 0 {
            table.retain_rows(&mask)?;
            debug!("Dropped duplicates. New shape: {:?}", table.frame().shape());
        }

        Ok((mask, duplicates))
    }
}

/// Verbatim copy of the identifier column taken right after loading.
///
/// Whatever happens to the working column, [`IdentifierGuard::restore`] puts
/// the raw strings back.
#[derive(Debug, Clone)]
pub struct IdentifierGuard {
    original: Series,
}

impl IdentifierGuard {
    /// Copy the table's identifier column, if it has one.
    pub fn capture(table: &Table) -> Result<Option<Self>> {
        let Some(id) = table.identifier() else {
            return Ok(None);
        };
        let original = table.series(id)?.clone();
        Ok(Some(Self { original }))
    }

    pub fn column(&self) -> &str {
        self.original.name().as_str()
    }

    /// Apply the same row filter as the table.
    pub fn retain(&mut self, mask: &BooleanChunked) -> Result<()> {
        self.original = self.original.filter(mask)?;
        Ok(())
    }

    /// Write the preserved values back, returning how many cells had drifted.
    pub fn restore(self, table: &mut Table) -> Result<usize> {
        let name = self.column().to_string();
        let current = table.values_str(&name)?;
        let original = crate::utils::series_to_strings(&self.original)?;
        let drifted = current
            .iter()
            .zip(original.iter())
            .filter(|(now, was)| now != was)
            .count();

        table.restore_column(self.original)?;
        if drifted > 0 {
            debug!("Restored {} drifted identifier values in '{}'", drifted, name);
        }
        Ok(drifted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let df = df![
            "Patient_Number" => ["1", "2", "1", "3", "2"],
            "Age" => [Some("40"), None, Some("40"), Some("50"), Some("41")],
        ]
        .unwrap();
        Table::new(df).with_identifier(Some("Patient_Number".to_string()))
    }

    #[test]
    fn test_keep_mask_first_occurrence_wins() {
        let mask = DuplicateRemover::keep_mask(&table()).unwrap();
        let keep: Vec<bool> = mask.into_iter().map(|v| v.unwrap_or(false)).collect();
        assert_eq!(keep, vec![true, true, false, true, true]);
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        let df = df![
            "a" => [Some("x"), Some("x")],
            "b" => [Option::<&str>::None, None],
        ]
        .unwrap();
        let mut table = Table::new(df);
        let (_, removed) = DuplicateRemover::remove(&mut table).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_keep_mask_typed_columns() {
        let df = df![
            "Age" => [Some(40.0), Some(40.0), None, None, Some(41.0)],
            "Smoking" => [1i32, 1, 0, 0, 1],
            "Sex" => ["male", "male", "female", "female", "male"],
        ]
        .unwrap();
        let table = Table::new(df);
        let mask = DuplicateRemover::keep_mask(&table).unwrap();
        let keep: Vec<bool> = mask.into_iter().map(|v| v.unwrap_or(false)).collect();
        assert_eq!(keep, vec![true, false, true, false, true]);
        // the row index never leaks into the table
        assert_eq!(table.column_names(), vec!["Age", "Smoking", "Sex"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table = table();
        let (_, removed) = DuplicateRemover::remove(&mut table).unwrap();
        assert_eq!(removed, 1);
        let ids: Vec<Option<String>> = table.values_str("Patient_Number").unwrap();
        assert_eq!(
            ids,
            vec![
                Some("1".to_string()),
                Some("2".to_string()),
                Some("3".to_string()),
                Some("2".to_string())
            ]
        );
    }

    #[test]
    fn test_guard_restores_verbatim_values() {
        let df = df![
            "Patient_Number" => ["007", "008"],
            "BMI" => ["20", "30"],
        ]
        .unwrap();
        let mut table = Table::new(df).with_identifier(Some("Patient_Number".to_string()));
        let guard = IdentifierGuard::capture(&table).unwrap().unwrap();

        // simulate coercion drift on the working copy
        table
            .set_categorical(
                "Patient_Number",
                vec![Some("7".to_string()), Some("008".to_string())],
            )
            .unwrap();

        let drifted = guard.restore(&mut table).unwrap();
        assert_eq!(drifted, 1);
        assert_eq!(
            table.values_str("Patient_Number").unwrap(),
            vec![Some("007".to_string()), Some("008".to_string())]
        );
    }

    #[test]
    fn test_guard_follows_row_filter() {
        let mut table = table();
        let mut guard = IdentifierGuard::capture(&table).unwrap().unwrap();
        let (mask, _) = DuplicateRemover::remove(&mut table).unwrap();
        guard.retain(&mask).unwrap();
        assert!(guard.restore(&mut table).is_ok());
        assert_eq!(table.height(), 4);
    }

    #[test]
    fn test_no_identifier_no_guard() {
        let df = df!["a" => ["1"]].unwrap();
        let table = Table::new(df);
        assert!(IdentifierGuard::capture(&table).unwrap().is_none());
    }
}
