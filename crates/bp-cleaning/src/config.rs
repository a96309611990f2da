//! Configuration types for the cleaning pipeline.
//!
//! Every knob has a default matching the fixed dataset contract, so
//! `CleaningConfig::default()` reproduces the standard run. The builder
//! validates values before a pipeline can be constructed.

use crate::normalizer::NormalizationRules;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Published location of the raw dataset.
pub const DEFAULT_SOURCE_URL: &str =
    "https://gayathiri-ravendirane.emi.u-bordeaux.fr/DATA/BloodPressure_kaggle.csv";

/// File name of the cleaned dataset, also the analysis stage's input.
pub const DEFAULT_OUTPUT_FILE: &str = "BloodPressure_kaggle_cleaned.csv";

/// Name of the patient identifier column.
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Patient_Number";

/// Name of the hemoglobin column.
pub const HEMOGLOBIN_COLUMN: &str = "Level_of_Hemoglobin";

/// Prefix of derived outlier flag columns.
pub const DEFAULT_FLAG_PREFIX: &str = "is_outlier_";

/// Inclusive physiologically plausible range for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBound {
    pub column: String,
    pub low: f64,
    pub high: f64,
}

impl RangeBound {
    pub fn new(column: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            column: column.into(),
            low,
            high,
        }
    }

    /// Whether `value` lies inside `[low, high]`.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// The standard physiological bounds: Age, BMI and hemoglobin level.
pub fn default_range_bounds() -> Vec<RangeBound> {
    vec![
        RangeBound::new("Age", 18.0, 100.0),
        RangeBound::new("BMI", 10.0, 60.0),
        RangeBound::new(HEMOGLOBIN_COLUMN, 4.0, 20.0),
    ]
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] for a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use bp_cleaning::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .identifier_column("Patient_Number")
///     .output_path("out/cleaned.csv")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Identifier column, matched case-insensitively against the header.
    /// Default: "Patient_Number"
    pub identifier_column: String,

    /// Columns whose absence aborts the run.
    /// Default: none
    pub required_columns: Vec<String>,

    /// Columns clipped to plausible ranges before any statistics are taken.
    pub range_bounds: Vec<RangeBound>,

    /// Minimum share of parseable cells for a column to become numeric.
    /// Default: 0.5
    pub numeric_threshold: f64,

    /// IQR multiplier for the outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Lower winsorization percentile (0.0 - 1.0).
    /// Default: 0.01
    pub winsor_lower: f64,

    /// Upper winsorization percentile (0.0 - 1.0).
    /// Default: 0.99
    pub winsor_upper: f64,

    /// Prefix of derived outlier flag columns.
    /// Default: "is_outlier_"
    pub flag_prefix: String,

    /// Fill value for missing categorical cells.
    /// Default: "Unknown"
    pub categorical_sentinel: String,

    /// Lookup tables used by the categorical normalizer.
    pub rules: NormalizationRules,

    /// Where the cleaned CSV is written.
    /// Default: "BloodPressure_kaggle_cleaned.csv"
    pub output_path: PathBuf,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            required_columns: Vec::new(),
            range_bounds: default_range_bounds(),
            numeric_threshold: 0.5,
            iqr_multiplier: 1.5,
            winsor_lower: 0.01,
            winsor_upper: 0.99,
            flag_prefix: DEFAULT_FLAG_PREFIX.to_string(),
            categorical_sentinel: "Unknown".to_string(),
            rules: NormalizationRules::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Name of the flag column derived from `column`.
    pub fn flag_column_name(&self, column: &str) -> String {
        format!("{}{}", self.flag_prefix, column)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.identifier_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("identifier_column"));
        }

        if self.flag_prefix.is_empty() {
            return Err(ConfigValidationError::EmptyField("flag_prefix"));
        }

        if !(0.0..=1.0).contains(&self.numeric_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "numeric_threshold".to_string(),
                value: self.numeric_threshold,
            });
        }

        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if !(0.0..=1.0).contains(&self.winsor_lower)
            || !(0.0..=1.0).contains(&self.winsor_upper)
            || self.winsor_lower >= self.winsor_upper
        {
            return Err(ConfigValidationError::InvalidPercentiles {
                lower: self.winsor_lower,
                upper: self.winsor_upper,
            });
        }

        for bound in &self.range_bounds {
            if !(bound.low.is_finite() && bound.high.is_finite()) || bound.low > bound.high {
                return Err(ConfigValidationError::InvalidRange {
                    column: bound.column.clone(),
                    low: bound.low,
                    high: bound.high,
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidMultiplier(f64),

    #[error("Invalid winsorization percentiles: {lower}..{upper} (need 0 <= lower < upper <= 1)")]
    InvalidPercentiles { lower: f64, upper: f64 },

    #[error("Invalid range for '{column}': [{low}, {high}]")]
    InvalidRange { column: String, low: f64, high: f64 },

    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    identifier_column: Option<String>,
    required_columns: Option<Vec<String>>,
    range_bounds: Option<Vec<RangeBound>>,
    numeric_threshold: Option<f64>,
    iqr_multiplier: Option<f64>,
    winsor_lower: Option<f64>,
    winsor_upper: Option<f64>,
    flag_prefix: Option<String>,
    categorical_sentinel: Option<String>,
    rules: Option<NormalizationRules>,
    output_path: Option<PathBuf>,
}

impl CleaningConfigBuilder {
    /// Set the identifier column name.
    pub fn identifier_column(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = Some(column.into());
        self
    }

    /// Set columns that must be present in the input.
    pub fn required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the physiological range table.
    pub fn range_bounds(mut self, bounds: Vec<RangeBound>) -> Self {
        self.range_bounds = Some(bounds);
        self
    }

    /// Set the parse-success share needed to treat a column as numeric.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = half the rows)
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier for the outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the winsorization percentiles.
    pub fn winsor_percentiles(mut self, lower: f64, upper: f64) -> Self {
        self.winsor_lower = Some(lower);
        self.winsor_upper = Some(upper);
        self
    }

    /// Set the flag column prefix.
    pub fn flag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.flag_prefix = Some(prefix.into());
        self
    }

    /// Set the fill value for missing categorical cells.
    pub fn categorical_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.categorical_sentinel = Some(sentinel.into());
        self
    }

    /// Substitute the normalization lookup tables.
    pub fn rules(mut self, rules: NormalizationRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Set the path of the cleaned CSV.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            identifier_column: self.identifier_column.unwrap_or(defaults.identifier_column),
            required_columns: self.required_columns.unwrap_or(defaults.required_columns),
            range_bounds: self.range_bounds.unwrap_or(defaults.range_bounds),
            numeric_threshold: self.numeric_threshold.unwrap_or(defaults.numeric_threshold),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            winsor_lower: self.winsor_lower.unwrap_or(defaults.winsor_lower),
            winsor_upper: self.winsor_upper.unwrap_or(defaults.winsor_upper),
            flag_prefix: self.flag_prefix.unwrap_or(defaults.flag_prefix),
            categorical_sentinel: self
                .categorical_sentinel
                .unwrap_or(defaults.categorical_sentinel),
            rules: self.rules.unwrap_or(defaults.rules),
            output_path: self.output_path.unwrap_or(defaults.output_path),
        };

        config.validate()?;
        Ok(config)
    }
}
