//! Run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzers::insights::DEFAULT_TOP_HIGHLIGHTS;
use crate::analyzers::DEFAULT_THRESHOLD;
use crate::prelude::*;
use crate::sources::CsvOptions;

/// Settings for one detection run.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it changes.
///
/// # Example
///
/// ```rust
/// use anomaly_watch::core::WatchConfig;
///
/// let config: WatchConfig = serde_json::from_str(r#"{ "threshold": 3.0 }"#).unwrap();
/// assert_eq!(config.threshold, 3.0);
/// assert_eq!(config.delimiter, ',');
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Sensitivity in standard deviations.
    pub threshold: f64,
    /// Column holding timestamps. Suggested from the header when unset.
    pub date_column: Option<String>,
    /// Column holding measurements. Suggested from the header when unset.
    pub value_column: Option<String>,
    /// Field delimiter of the input file.
    pub delimiter: char,
    /// Spikes and dips highlighted per direction.
    pub top_highlights: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            date_column: None,
            value_column: None,
            delimiter: ',',
            top_highlights: DEFAULT_TOP_HIGHLIGHTS,
        }
    }
}

impl WatchConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: WatchConfig = serde_json::from_str(&contents).map_err(|e| {
            AnomalyWatchError::Parse(format!("Invalid configuration in {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(AnomalyWatchError::Configuration(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    fn delimiter_byte(&self) -> Result<u8> {
        if matches!(self.delimiter, '\n' | '\r') {
            return Err(AnomalyWatchError::Configuration(
                "delimiter must not be a line break".to_string(),
            ));
        }
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                AnomalyWatchError::Configuration(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }

    /// Sets the threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets both columns.
    pub fn with_columns(mut self, date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        self.date_column = Some(date_column.into());
        self.value_column = Some(value_column.into());
        self
    }

    /// Sets the delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parser options derived from this configuration.
    ///
    /// Fails on the same delimiters [`validate`](Self::validate) rejects.
    pub fn csv_options(&self) -> Result<CsvOptions> {
        Ok(CsvOptions::default().with_delimiter(self.delimiter_byte()?))
    }
}
