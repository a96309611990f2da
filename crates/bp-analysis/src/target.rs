//! Loading the cleaned dataset and resolving the target and its flag.

use crate::error::{AnalysisError, Result};
use bp_cleaning::{flag_values, load_raw_table, series_to_f64, DataSource};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Where the outlier flags came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    /// Read from the flag column of the cleaned file.
    Stored,
    /// Recomputed from the target with the IQR rule.
    Recomputed,
}

/// Numeric target values and their 0/1 outlier flags.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub flags: Vec<i32>,
    pub flag_source: FlagSource,
}

impl TargetColumn {
    pub fn flagged_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f == 1).count()
    }

    /// Row indices of flagged rows, in file order.
    pub fn flagged_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| **f == 1)
            .map(|(i, _)| i)
    }
}

/// Load the cleaned CSV, every column as text.
pub fn load_cleaned(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(AnalysisError::MissingPrerequisite(format!(
            "Missing file: {}. Please run the cleaning stage first.",
            path.display()
        )));
    }
    Ok(load_raw_table(&DataSource::Local(path.to_path_buf()))?)
}

/// Coerce the target to numeric and find or recompute its flag.
///
/// A stored flag reads 1 where the cell parses to exactly 1 and 0 anywhere
/// else, missing included.
pub fn resolve_target(
    df: &DataFrame,
    target: &str,
    flag_column: &str,
    iqr_multiplier: f64,
) -> Result<TargetColumn> {
    let column = df.column(target).map_err(|_| {
        AnalysisError::MissingPrerequisite(format!(
            "Column '{}' not found in cleaned dataset.",
            target
        ))
    })?;
    let values = series_to_f64(column.as_materialized_series())?;
    debug!(
        "Target '{}': {} of {} values numeric",
        target,
        values.iter().flatten().count(),
        values.len()
    );

    let (flags, flag_source) = match df.column(flag_column) {
        Ok(flag) => {
            let flags = series_to_f64(flag.as_materialized_series())?
                .into_iter()
                .map(|v| i32::from(v == Some(1.0)))
                .collect();
            (flags, FlagSource::Stored)
        }
        Err(_) => {
            info!("'{}' absent; recomputing with the IQR rule", flag_column);
            let (flags, _) = flag_values(&values, iqr_multiplier);
            (flags, FlagSource::Recomputed)
        }
    };

    Ok(TargetColumn {
        name: target.to_string(),
        values,
        flags,
        flag_source,
    })
}
