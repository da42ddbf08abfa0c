//! Analysis of a projected time series.
//!
//! ## Available Analyzers
//!
//! - **Value parsing** (`temporal`): timestamp and measurement recognition for raw cells
//! - **Sample statistics** (`statistics`): mean and population standard deviation
//! - **Z-score detection** (`anomaly`): spike and dip classification against a threshold
//! - **Column suggestions** (`suggestions`): header-based guess of the date and value columns
//! - **Insights** (`insights`): counts, highlights and a narrative for a classified series
//!
//! ## Example Usage
//!
//! ```rust
//! use anomaly_watch::analyzers::{suggest_columns, ZScoreDetector};
//! use anomaly_watch::sources::parse_csv;
//!
//! let table = parse_csv("order_date,revenue\n2024-01-01,10\n2024-01-02,12\n");
//! let suggestion = suggest_columns(table.headers()).unwrap();
//! let value_column = suggestion.value_column.unwrap();
//!
//! let points = ZScoreDetector::default().detect(
//!     table.rows(),
//!     &suggestion.date_column,
//!     &value_column,
//! );
//! assert_eq!(points.len(), 2);
//! assert!(points.iter().all(|p| !p.is_anomaly()));
//! ```

pub mod anomaly;
pub mod insights;
pub mod statistics;
pub mod suggestions;
pub mod temporal;

pub use anomaly::{
    classify_observations, detect_anomalies, project_observations, AnomalyType, DataPoint,
    Observation, ZScoreDetector, DEFAULT_THRESHOLD, RECOMMENDED_MAX_THRESHOLD,
    RECOMMENDED_MIN_THRESHOLD,
};
pub use insights::{
    format_percent, percent_change, Highlight, InsightsSummary, SensitivityLevel,
    DEFAULT_TOP_HIGHLIGHTS,
};
pub use statistics::SampleStatistics;
pub use suggestions::{suggest_columns, ColumnSuggestion};
pub use temporal::{parse_timestamp, parse_value};
