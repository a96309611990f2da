use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical kind of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Patient identifier, carried through untouched.
    Identifier,
    /// Floating point measurements.
    Numeric,
    /// Free text or coded labels.
    Categorical,
    /// Derived 0/1 column.
    Flag,
}

/// Median imputation applied to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationStat {
    pub median: f64,
    pub filled: usize,
}

/// IQR fences computed for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierStat {
    /// `None` when the column had no values to compute quartiles from.
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    /// `None` when IQR was undefined or zero; no row is flagged then.
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub flagged: usize,
}

/// Clipping interval applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinsorBounds {
    pub lower: f64,
    pub upper: f64,
    pub clipped: usize,
}

/// Change counts from the categorical normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationCounts {
    /// Missing categorical cells replaced by the sentinel, per column.
    pub sentinel_filled: BTreeMap<String, usize>,
    /// Sex cells whose normalized value differs from the raw text.
    pub sex_remapped: usize,
    /// Binary-flag columns converted to 0/1 and their count of ones.
    pub binary_ones: BTreeMap<String, usize>,
    /// Present binary-flag cells matching neither a true nor a false token.
    pub unrecognized_binary: BTreeMap<String, usize>,
    /// Pregnancy flags forced to 0 on male rows.
    pub pregnancy_corrected: usize,
}

/// Summary statistics of one cleaning run.
///
/// Maps are keyed by column name and ordered, so the JSON output is stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub source: String,
    pub output_file: Option<String>,
    pub generated_at: String,
    pub duration_ms: u64,

    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
    pub columns_written: usize,

    pub identifier_column: Option<String>,
    /// Cells set to missing by the range sanitizer.
    pub out_of_range: BTreeMap<String, usize>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub imputation: BTreeMap<String, ImputationStat>,
    /// Numeric columns with no value at all; left missing.
    pub all_missing_columns: Vec<String>,
    pub outliers: BTreeMap<String, OutlierStat>,
    pub winsorized: BTreeMap<String, WinsorBounds>,
    pub normalization: NormalizationCounts,
    /// Version of the normalization rules used.
    pub rules_version: u32,
    pub dropped_flags: Vec<String>,
    pub retained_flags: Vec<String>,
}

impl CleaningReport {
    /// Flagged row count per column, in column-name order.
    pub fn outlier_counts(&self) -> Vec<(&str, usize)> {
        self.outliers
            .iter()
            .map(|(name, stat)| (name.as_str(), stat.flagged))
            .collect()
    }
}
