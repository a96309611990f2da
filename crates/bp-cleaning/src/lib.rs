//! Blood-Pressure Dataset Cleaning Library
//!
//! Cleans the blood-pressure patient dataset with Polars and produces the
//! file the hemoglobin analysis stage consumes.
//!
//! # Overview
//!
//! The pipeline runs a fixed sequence over one table:
//!
//! - **Loading**: local path or URL, every column read as text
//! - **Deduplication**: exact duplicate rows dropped, first occurrence wins
//! - **Range Sanitization**: impossible Age, BMI and hemoglobin values become missing
//! - **Type Coercion**: columns that are at least half numeric become Float64
//! - **Imputation**: missing numeric values replaced by the column median
//! - **Outlier Flagging**: `is_outlier_<column>` from Tukey's IQR fences
//! - **Winsorization**: numeric values clipped to the 1st/99th percentile
//! - **Categorical Normalization**: `Unknown` sentinel, canonical `Sex`, 0/1 binary flags
//! - **Flag Pruning**: all-zero flags and identifier flags dropped
//!
//! The patient identifier is never transformed: a verbatim copy taken at load
//! time is written back before serialization.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bp_cleaning::{CleaningConfig, CleaningPipeline, DataSource};
//!
//! let config = CleaningConfig::builder()
//!     .output_path("BloodPressure_kaggle_cleaned.csv")
//!     .build()?;
//!
//! let outcome = CleaningPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&DataSource::parse("BloodPressure_kaggle.csv"))?;
//!
//! println!("{} rows written", outcome.report.rows_written);
//! ```
//!
//! # Statistics
//!
//! Every quantile (median, quartiles, winsorization percentiles) uses linear
//! interpolation between closest ranks, see [`utils::quantile_sorted`]. The
//! analysis stage uses the same functions so its recomputed flags agree with
//! the ones written here.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod normalizer;
pub mod pipeline;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DuplicateRemover, IdentifierGuard, NumericCoercer, RangeSanitizer};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, RangeBound,
    DEFAULT_FLAG_PREFIX, DEFAULT_IDENTIFIER_COLUMN, DEFAULT_OUTPUT_FILE, DEFAULT_SOURCE_URL,
    HEMOGLOBIN_COLUMN,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::{ImputationOutcome, MedianImputer};
pub use io::{load_raw_table, read_bytes, write_csv, DataSource};
pub use normalizer::{CategoricalNormalizer, NormalizationRules, SexCategory};
pub use pipeline::{
    flag_values, CleaningExecutor, CleaningOutcome, CleaningPipeline, CleaningPipelineBuilder,
    CleaningStage, ClosureProgressReporter, FlagPruner, IqrFences, OutlierFlagger,
    ProgressReporter, ProgressUpdate, Winsorizer,
};
pub use reporting::ReportGenerator;
pub use table::Table;
pub use types::{
    CleaningReport, ColumnKind, ImputationStat, NormalizationCounts, OutlierStat, WinsorBounds,
};
pub use utils::{
    find_column_ci, format_number, is_numeric_dtype, median, parse_numeric_string, quantile,
    quantile_sorted, series_to_f64, series_to_strings, sorted_present,
};
