//! Pipeline module.
//!
//! The driver that runs the cleaning components in their fixed order, plus
//! the outlier components and progress reporting it uses.

mod builder;
mod executor;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningOutcome, CleaningPipeline, CleaningPipelineBuilder};
pub use executor::CleaningExecutor;
pub use outliers::{flag_values, FlagPruner, IqrFences, OutlierFlagger, Winsorizer};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
