//! Error types for the anomaly-watch library.
//!
//! The detection pipeline itself is fail-open: malformed rows are dropped and
//! degenerate statistics are handled by policy, so none of those surface here.
//! `AnomalyWatchError` covers what can genuinely go wrong around the pipeline:
//! acquiring input, reading configuration, rendering output, and callers
//! asking for columns that the dataset does not have.

use thiserror::Error;

/// The main error type for the anomaly-watch library.
#[derive(Error, Debug)]
pub enum AnomalyWatchError {
    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when parsing configuration or command line input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error when a requested column is not part of the dataset header.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, AnomalyWatchError>`.
///
/// # Examples
///
/// ```rust
/// use anomaly_watch::error::Result;
///
/// fn load() -> Result<()> {
///     Ok(())
/// }
/// # load().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, AnomalyWatchError>;

impl AnomalyWatchError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }
}

impl From<serde_json::Error> for AnomalyWatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for AnomalyWatchError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(format!("Failed to write formatted output: {err}"))
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AnomalyWatchError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            AnomalyWatchError::Internal(inner) => {
                AnomalyWatchError::Internal(format!("{msg}: {inner}"))
            }
            other => AnomalyWatchError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                AnomalyWatchError::Internal(inner) => {
                    AnomalyWatchError::Internal(format!("{msg}: {inner}"))
                }
                other => AnomalyWatchError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_display() {
        let err = AnomalyWatchError::column_not_found("revenue");
        assert_eq!(err.to_string(), "Column 'revenue' not found in dataset");
    }

    #[test]
    fn test_data_source_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AnomalyWatchError::data_source_with_source("CSV", "cannot open", Box::new(io));
        assert_eq!(err.to_string(), "Data source error: cannot open");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("Reading series").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Internal error: Reading series"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_from_serde_json() {
        let err: AnomalyWatchError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, AnomalyWatchError::Serialization(_)));
    }
}
