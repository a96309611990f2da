//! Error types for the cleaning stage.
//!
//! Only structural problems are errors here: a source that cannot be read, a
//! column the run cannot do without, an output that cannot be written.
//! Per-cell parse failures and undefined statistics on empty columns are
//! absorbed by the components themselves and never surface as an error.
//!
//! Errors are serializable so the CLI can emit them inside a JSON report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A file, URL or column the run depends on is absent.
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    /// Two columns of the table disagree on their row count.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "remote" feature).
    #[cfg(feature = "remote")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "remote")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error means an input the run depends on was absent.
    pub fn is_missing_prerequisite(&self) -> bool {
        match self {
            Self::MissingPrerequisite(_) | Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_missing_prerequisite(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::MissingPrerequisite("data.csv".to_string()).error_code(),
            "MISSING_PREREQUISITE"
        );
        assert_eq!(
            CleaningError::ColumnNotFound("Age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_missing_prerequisite() {
        assert!(CleaningError::MissingPrerequisite("x".to_string()).is_missing_prerequisite());
        assert!(CleaningError::ColumnNotFound("x".to_string()).is_missing_prerequisite());
        let io = CleaningError::Io(std::io::Error::other("disk full"));
        assert!(!io.is_missing_prerequisite());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::ColumnNotFound("Level_of_Hemoglobin".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Level_of_Hemoglobin"));
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = CleaningError::MissingPrerequisite("input.csv".to_string())
            .with_context("While loading dataset");
        assert!(error.to_string().contains("While loading dataset"));
        assert_eq!(error.error_code(), "MISSING_PREREQUISITE");
        assert!(error.is_missing_prerequisite());
    }
}
