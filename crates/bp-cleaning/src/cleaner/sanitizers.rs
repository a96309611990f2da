//! Physiological range sanitization.

use crate::config::RangeBound;
use crate::error::Result;
use crate::table::Table;
use crate::types::ColumnKind;
use std::collections::BTreeMap;
use tracing::debug;

/// Turns physiologically impossible values into missing ones.
pub struct RangeSanitizer;

impl RangeSanitizer {
    /// Parse each bounded column to numeric and null out-of-range values.
    ///
    /// Columns absent from the table are skipped, as is the identifier.
    /// Returns the number of values removed per sanitized column.
    pub fn sanitize(table: &mut Table, bounds: &[RangeBound]) -> Result<BTreeMap<String, usize>> {
        let mut removed = BTreeMap::new();

        for bound in bounds {
            if !table.has_column(&bound.column)
                || table.kind(&bound.column) == Some(ColumnKind::Identifier)
            {
                continue;
            }

            let values = table.values_f64(&bound.column)?;
            let (sanitized, count) = Self::sanitize_values(&values, bound);
            table.set_numeric(&bound.column, sanitized)?;

            debug!(
                "Sanitized '{}' to [{}, {}]: {} values out of range",
                bound.column, bound.low, bound.high, count
            );
            removed.insert(bound.column.clone(), count);
        }

        Ok(removed)
    }

    /// Null every value outside `bound`; missing stays missing.
    pub fn sanitize_values(values: &[Option<f64>], bound: &RangeBound) -> (Vec<Option<f64>>, usize) {
        let mut out_of_range = 0;
        let sanitized = values
            .iter()
            .map(|v| match v {
                Some(x) if bound.contains(*x) => Some(*x),
                Some(_) => {
                    out_of_range += 1;
                    None
                }
                None => None,
            })
            .collect();
        (sanitized, out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_range_bounds;
    use polars::prelude::*;

    fn table() -> Table {
        let df = df![
            "Age" => [Some("17"), Some("18"), Some("100"), Some("101"), Some("old"), None],
            "Level_of_Hemoglobin" => [Some("50"), Some("12.5"), Some("4"), Some("20"), Some("3.9"), Some("11")],
            "Other" => ["a", "b", "c", "d", "e", "f"],
        ]
        .unwrap();
        Table::new(df)
    }

    #[test]
    fn test_inclusive_bounds() {
        let mut table = table();
        let removed = RangeSanitizer::sanitize(&mut table, &default_range_bounds()).unwrap();

        assert_eq!(
            table.values_f64("Age").unwrap(),
            vec![None, Some(18.0), Some(100.0), None, None, None]
        );
        assert_eq!(removed["Age"], 2);
        assert_eq!(removed["Level_of_Hemoglobin"], 2);
        assert_eq!(table.kind("Age"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_absent_columns_skipped() {
        let mut table = table();
        let removed = RangeSanitizer::sanitize(&mut table, &default_range_bounds()).unwrap();
        assert!(!removed.contains_key("BMI"));
        assert_eq!(table.kind("Other"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut once = table();
        RangeSanitizer::sanitize(&mut once, &default_range_bounds()).unwrap();
        let mut twice = once.clone();
        let removed = RangeSanitizer::sanitize(&mut twice, &default_range_bounds()).unwrap();

        for col in ["Age", "Level_of_Hemoglobin"] {
            assert_eq!(once.values_f64(col).unwrap(), twice.values_f64(col).unwrap());
            assert_eq!(removed[col], 0);
        }
    }

    #[test]
    fn test_sanitize_values_counts() {
        let bound = RangeBound::new("BMI", 10.0, 60.0);
        let (values, count) =
            RangeSanitizer::sanitize_values(&[Some(9.9), Some(10.0), None, Some(60.1)], &bound);
        assert_eq!(values, vec![None, Some(10.0), None, None]);
        assert_eq!(count, 2);
    }
}
