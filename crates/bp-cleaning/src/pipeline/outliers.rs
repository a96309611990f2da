//! Outlier handling: IQR flagging, winsorization and flag pruning.
//!
//! All three run on numeric columns after imputation. Fences and clipping
//! bounds are computed from the column's current values with the shared
//! linear quantile in [`crate::utils`], so the analysis stage can recompute a
//! flag and get the same answer.

use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnKind, OutlierStat, WinsorBounds};
use crate::utils::{quantile_sorted, sorted_present};
use std::collections::BTreeMap;
use tracing::debug;

/// Quartiles and fences of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFences {
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    /// Both fences are `None` when the IQR is undefined or zero.
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl IqrFences {
    /// Compute Tukey fences `Q1 - k*IQR` and `Q3 + k*IQR`.
    pub fn compute(values: &[Option<f64>], multiplier: f64) -> Self {
        let sorted = sorted_present(values);
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);

        let (lower, upper) = match (q1, q3) {
            (Some(q1), Some(q3)) if q3 - q1 > 0.0 => {
                let iqr = q3 - q1;
                (Some(q1 - multiplier * iqr), Some(q3 + multiplier * iqr))
            }
            _ => (None, None),
        };

        Self { q1, q3, lower, upper }
    }

    /// Whether `value` falls strictly outside the fences.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => value < lower || value > upper,
            _ => false,
        }
    }
}

/// 0/1 outlier flags for `values` plus the statistics behind them.
///
/// Missing values are never flagged.
pub fn flag_values(values: &[Option<f64>], multiplier: f64) -> (Vec<i32>, OutlierStat) {
    let fences = IqrFences::compute(values, multiplier);
    let flags: Vec<i32> = values
        .iter()
        .map(|v| match v {
            Some(x) if fences.is_outlier(*x) => 1,
            _ => 0,
        })
        .collect();
    let flagged = flags.iter().filter(|&&f| f == 1).count();

    let stat = OutlierStat {
        q1: fences.q1,
        q3: fences.q3,
        lower: fences.lower,
        upper: fences.upper,
        flagged,
    };
    (flags, stat)
}

/// Adds one `<prefix><column>` flag column per numeric column.
pub struct OutlierFlagger;

impl OutlierFlagger {
    /// Flag every numeric column. Flag columns are appended in numeric-column
    /// order. Returns the statistics per source column.
    pub fn apply(
        table: &mut Table,
        multiplier: f64,
        prefix: &str,
    ) -> Result<BTreeMap<String, OutlierStat>> {
        let mut stats = BTreeMap::new();

        for name in table.columns_of_kind(ColumnKind::Numeric) {
            if name.starts_with(prefix) {
                continue;
            }
            let values = table.values_f64(&name)?;
            let (flags, stat) = flag_values(&values, multiplier);

            debug!(
                "Flagged {} outliers in '{}' (fences {:?}..{:?})",
                stat.flagged, name, stat.lower, stat.upper
            );
            table.set_flag(&format!("{}{}", prefix, name), flags)?;
            stats.insert(name, stat);
        }

        Ok(stats)
    }
}

/// Clips numeric columns to their own percentile range.
pub struct Winsorizer;

impl Winsorizer {
    /// Winsorize every numeric column with at least one value.
    pub fn apply(table: &mut Table, lower_p: f64, upper_p: f64) -> Result<BTreeMap<String, WinsorBounds>> {
        let mut applied = BTreeMap::new();

        for name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = table.values_f64(&name)?;
            let Some((clipped, bounds)) = Self::clip_values(&values, lower_p, upper_p) else {
                continue;
            };
            if bounds.clipped > 0 {
                table.set_numeric(&name, clipped)?;
            }
            debug!(
                "Winsorized '{}' to [{}, {}], {} values clipped",
                name, bounds.lower, bounds.upper, bounds.clipped
            );
            applied.insert(name, bounds);
        }

        Ok(applied)
    }

    /// Clip present values to `[q(lower_p), q(upper_p)]`.
    ///
    /// Returns `None` for a column without values.
    pub fn clip_values(
        values: &[Option<f64>],
        lower_p: f64,
        upper_p: f64,
    ) -> Option<(Vec<Option<f64>>, WinsorBounds)> {
        let sorted = sorted_present(values);
        let lower = quantile_sorted(&sorted, lower_p)?;
        let upper = quantile_sorted(&sorted, upper_p)?;

        let mut clipped = 0;
        let out = values
            .iter()
            .map(|v| {
                v.map(|x| {
                    let c = x.clamp(lower, upper);
                    if c != x {
                        clipped += 1;
                    }
                    c
                })
            })
            .collect();

        Some((out, WinsorBounds { lower, upper, clipped }))
    }
}

/// Removes flag columns that carry no information.
pub struct FlagPruner;

impl FlagPruner {
    /// Drop every `prefix` column whose sum is zero or whose name mentions
    /// the identifier (ignoring case).
    ///
    /// Returns `(dropped, retained)` flag column names in frame order.
    pub fn prune(
        table: &mut Table,
        prefix: &str,
        identifier: &str,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let identifier = identifier.to_lowercase();
        let mut dropped = Vec::new();
        let mut retained = Vec::new();

        let flag_columns: Vec<String> = table
            .column_names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect();

        for name in flag_columns {
            let mentions_identifier =
                !identifier.is_empty() && name.to_lowercase().contains(&identifier);
            let sum: f64 = table.values_f64(&name)?.into_iter().flatten().sum();

            if mentions_identifier || sum == 0.0 {
                debug!("Dropping flag column '{}' (sum {})", name, sum);
                table.drop_column(&name)?;
                dropped.push(name);
            } else {
                retained.push(name);
            }
        }

        Ok((dropped, retained))
    }
}
