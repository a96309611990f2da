//! Configuration for the analysis stage.

use bp_cleaning::{DEFAULT_FLAG_PREFIX, DEFAULT_OUTPUT_FILE, HEMOGLOBIN_COLUMN};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory the histogram is written to.
pub const DEFAULT_PLOTS_DIR: &str = "plots";

/// File name of the histogram image.
pub const HISTOGRAM_FILE: &str = "hemoglobin_hist.png";

/// Columns shown in the flagged-row preview, when present.
pub const PREVIEW_COLUMNS: [&str; 5] = ["Patient_Number", "Sex", "Age", "BMI", HEMOGLOBIN_COLUMN];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// The cleaned CSV.
    /// Default: "BloodPressure_kaggle_cleaned.csv"
    pub input: PathBuf,

    /// Default: "plots"
    pub plots_dir: PathBuf,

    /// Numeric column under study, matched by exact name.
    /// Default: "Level_of_Hemoglobin"
    pub target_column: String,

    /// Outlier flag of the target. Recomputed when absent.
    /// Default: "is_outlier_Level_of_Hemoglobin"
    pub flag_column: String,

    /// Column the descriptive statistics are partitioned by.
    /// Default: "Sex"
    pub group_column: String,

    /// Default: 5
    pub preview_rows: usize,

    /// Default: 60
    pub histogram_bins: usize,

    /// Must match the multiplier the cleaning stage used.
    /// Default: 1.5
    pub iqr_multiplier: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_OUTPUT_FILE),
            plots_dir: PathBuf::from(DEFAULT_PLOTS_DIR),
            target_column: HEMOGLOBIN_COLUMN.to_string(),
            flag_column: format!("{}{}", DEFAULT_FLAG_PREFIX, HEMOGLOBIN_COLUMN),
            group_column: "Sex".to_string(),
            preview_rows: 5,
            histogram_bins: 60,
            iqr_multiplier: 1.5,
        }
    }
}

impl AnalysisConfig {
    pub fn histogram_path(&self) -> PathBuf {
        self.plots_dir.join(HISTOGRAM_FILE)
    }
}
