//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use bp_cleaning::CleaningPipeline;
//!
//! let outcome = CleaningPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&source)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Reading the raw CSV
    Loading,
    /// Dropping exact duplicate rows
    Deduplication,
    /// Nulling physiologically impossible values
    RangeSanitization,
    /// Converting mostly-numeric text columns
    TypeCoercion,
    /// Filling numeric gaps with the median
    Imputation,
    /// Adding IQR outlier flags
    OutlierFlagging,
    /// Clipping to the 1st/99th percentile
    Winsorization,
    /// Sentinel filling and sex canonicalization
    Normalization,
    /// Binary flags and the pregnancy correction
    BinaryFlags,
    /// Dropping flags that carry no information
    FlagPruning,
    /// Serializing the cleaned CSV
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Deduplication => "Removing Duplicates",
            Self::RangeSanitization => "Sanitizing Ranges",
            Self::TypeCoercion => "Coercing Types",
            Self::Imputation => "Imputing Values",
            Self::OutlierFlagging => "Flagging Outliers",
            Self::Winsorization => "Winsorizing",
            Self::Normalization => "Normalizing Categories",
            Self::BinaryFlags => "Normalizing Binary Flags",
            Self::FlagPruning => "Pruning Flags",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Position of this stage among the working stages.
    fn index(&self) -> Option<usize> {
        match self {
            Self::Loading => Some(0),
            Self::Deduplication => Some(1),
            Self::RangeSanitization => Some(2),
            Self::TypeCoercion => Some(3),
            Self::Imputation => Some(4),
            Self::OutlierFlagging => Some(5),
            Self::Winsorization => Some(6),
            Self::Normalization => Some(7),
            Self::BinaryFlags => Some(8),
            Self::FlagPruning => Some(9),
            Self::Writing => Some(10),
            Self::Complete | Self::Failed => None,
        }
    }

    /// Number of working stages.
    pub const WORKING_STAGES: usize = 11;

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self.index() {
            Some(i) => i as f32 / Self::WORKING_STAGES as f32,
            None if *self == Self::Complete => 1.0,
            None => 0.0,
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Progress update at the start of `stage`.
    pub fn new(stage: CleaningStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from a running pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Adapts a closure into a [`ProgressReporter`].
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
