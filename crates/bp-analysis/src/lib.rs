//! Hemoglobin Outlier Analysis
//!
//! Reads the file written by `bp-cleaning` and reports on one numeric
//! target column:
//!
//! - the number of rows carrying its outlier flag (stored, or recomputed
//!   with the same IQR rule the cleaning stage uses)
//! - a preview of the first flagged rows
//! - an equal-width histogram written as PNG
//! - count, mean, std, min, quartiles and max per `Sex` group
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bp_analysis::{AnalysisConfig, Analyzer};
//!
//! let report = Analyzer::new(AnalysisConfig::default()).run()?;
//! println!("{}", report.render_text());
//! ```

pub mod config;
pub mod error;
pub mod histogram;
pub mod report;
pub mod summary;
pub mod target;

pub use config::{AnalysisConfig, DEFAULT_PLOTS_DIR, HISTOGRAM_FILE, PREVIEW_COLUMNS};
pub use error::{AnalysisError, Result};
pub use histogram::{histogram_bins, render_histogram, HistogramBin};
pub use report::{AnalysisReport, Analyzer};
pub use summary::{grouped_describe, Describe, DescribeTable, FlaggedPreview, MISSING_GROUP};
pub use target::{load_cleaned, resolve_target, FlagSource, TargetColumn};
