//! Median imputation.

use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnKind, ImputationStat};
use crate::utils::median;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What the imputer did across the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputationOutcome {
    /// Median and fill count per imputed column.
    pub imputed: BTreeMap<String, ImputationStat>,
    /// Numeric columns without a single value, in frame order.
    pub all_missing: Vec<String>,
}

/// Fills missing numeric cells with the column median.
pub struct MedianImputer;

impl MedianImputer {
    /// Impute every numeric column of the table.
    pub fn apply(table: &mut Table) -> Result<ImputationOutcome> {
        let mut outcome = ImputationOutcome::default();

        for name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = table.values_f64(&name)?;
            match Self::fill_values(&values) {
                Some((filled_values, stat)) => {
                    if stat.filled > 0 {
                        table.set_numeric(&name, filled_values)?;
                        debug!(
                            "Filled {} missing values in '{}' with median {}",
                            stat.filled, name, stat.median
                        );
                    }
                    outcome.imputed.insert(name, stat);
                }
                None => {
                    warn!("Column '{}' has no values; median undefined, left missing", name);
                    outcome.all_missing.push(name);
                }
            }
        }

        Ok(outcome)
    }

    /// Replace missing values with the median of the present ones.
    ///
    /// Returns `None` when nothing is present to take a median of.
    pub fn fill_values(values: &[Option<f64>]) -> Option<(Vec<Option<f64>>, ImputationStat)> {
        let median = median(values)?;
        let mut filled = 0;
        let out = values
            .iter()
            .map(|v| {
                Some(v.unwrap_or_else(|| {
                    filled += 1;
                    median
                }))
            })
            .collect();
        Some((out, ImputationStat { median, filled }))
    }
}
