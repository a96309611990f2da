//! Imputation of missing numeric values.
//!
//! Every numeric column is filled with its own median. A column with no
//! values at all has no median and is left missing.

mod statistical;

pub use statistical::{ImputationOutcome, MedianImputer};
