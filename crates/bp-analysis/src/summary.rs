//! Descriptive statistics and the flagged-row preview.

use crate::target::TargetColumn;
use bp_cleaning::{format_number, quantile_sorted, series_to_strings, sorted_present};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for rows whose group cell is missing.
pub const MISSING_GROUP: &str = "Unknown";

/// count, mean, sample std, min, quartiles and max of one sample.
///
/// Statistics are `None` when undefined: everything but `count` for an
/// empty sample, `std` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    pub fn of(values: &[Option<f64>]) -> Self {
        let sorted = sorted_present(values);
        let n = sorted.len();
        let mean = (n > 0).then(|| sorted.iter().sum::<f64>() / n as f64);
        let std = match mean {
            Some(m) if n > 1 => {
                let ss: f64 = sorted.iter().map(|x| (x - m).powi(2)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };

        Self {
            count: n,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// [`Describe`] of `values` per distinct key, keys sorted.
pub fn grouped_describe(keys: &[Option<String>], values: &[Option<f64>]) -> BTreeMap<String, Describe> {
    let mut groups: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values) {
        let key = key.clone().unwrap_or_else(|| MISSING_GROUP.to_string());
        groups.entry(key).or_default().push(*value);
    }
    groups
        .into_iter()
        .map(|(key, group)| (key, Describe::of(&group)))
        .collect()
}

/// Leading flagged rows restricted to the display columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlaggedPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlaggedPreview {
    /// Collect up to `limit` flagged rows.
    ///
    /// Display columns absent from `df` are skipped. The target is shown as
    /// coerced to numeric and the flag column is always last.
    pub fn build(
        df: &DataFrame,
        target: &TargetColumn,
        display_columns: &[&str],
        flag_column: &str,
        limit: usize,
    ) -> PolarsResult<Self> {
        let rows: Vec<usize> = target.flagged_rows().take(limit).collect();

        let mut columns = Vec::new();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); rows.len()];
        for &name in display_columns {
            let rendered: Vec<String> = if name == target.name {
                rows.iter().map(|&i| render(target.values[i])).collect()
            } else if let Ok(column) = df.column(name) {
                let text = series_to_strings(column.as_materialized_series())?;
                rows.iter()
                    .map(|&i| text[i].clone().unwrap_or_else(|| "NaN".to_string()))
                    .collect()
            } else {
                continue;
            };
            columns.push(name.to_string());
            for (row, cell) in cells.iter_mut().zip(rendered) {
                row.push(cell);
            }
        }

        columns.push(flag_column.to_string());
        for (row, &i) in cells.iter_mut().zip(&rows) {
            row.push(target.flags[i].to_string());
        }

        Ok(Self { columns, rows: cells })
    }

    /// Widest cell of every column, header included.
    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                self.rows
                    .iter()
                    .map(|r| r[c].len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Fixed-width text table, one line per row.
impl fmt::Display for FlaggedPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        for line in std::iter::once(&self.columns).chain(&self.rows) {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

fn render(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), format_number)
}

fn render_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.6}", v))
}

/// Grouped statistics as a text table, one line per group.
pub struct DescribeTable<'a> {
    pub group_column: &'a str,
    pub groups: &'a BTreeMap<String, Describe>,
}

impl fmt::Display for DescribeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = self
            .groups
            .keys()
            .map(String::len)
            .chain(std::iter::once(self.group_column.len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:<kw$} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            self.group_column, "count", "mean", "std", "min", "25%", "50%", "75%", "max",
        )?;
        for (key, d) in self.groups {
            writeln!(
                f,
                "{:<kw$} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                key,
                d.count,
                render_stat(d.mean),
                render_stat(d.std),
                render_stat(d.min),
                render_stat(d.q25),
                render_stat(d.q50),
                render_stat(d.q75),
                render_stat(d.max),
            )?;
        }
        Ok(())
    }
}
