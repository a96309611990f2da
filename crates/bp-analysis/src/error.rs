//! Error types for the analysis stage.

use bp_cleaning::CleaningError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The cleaned file or the target column is absent.
    #[error("{0}")]
    MissingPrerequisite(String),

    /// Failure inside the shared loading code.
    #[error(transparent)]
    Cleaning(#[from] CleaningError),

    /// The histogram could not be drawn or encoded.
    #[error("Plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Stable error code, used in JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            Self::Cleaning(inner) => inner.error_code(),
            Self::Plot(_) => "PLOT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    pub fn is_missing_prerequisite(&self) -> bool {
        match self {
            Self::MissingPrerequisite(_) => true,
            Self::Cleaning(inner) => inner.is_missing_prerequisite(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
