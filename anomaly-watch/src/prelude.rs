//! Prelude for commonly used types and traits in anomaly-watch.

pub use crate::analyzers::{AnomalyType, DataPoint, ZScoreDetector};
pub use crate::core::{AnalysisSession, DetectionReport, WatchConfig};
pub use crate::error::{AnomalyWatchError, ErrorContext, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::{RawRow, Table, TabularSource};
