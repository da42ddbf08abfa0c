//! Detection runs over a loaded table.
//!
//! - **[`WatchConfig`]**: threshold, column overrides and parsing options
//! - **[`AnalysisSession`]**: a table with its selected columns cached for repeated runs
//! - **[`DetectionReport`]**: classified points with statistics and insights
//!
//! ## Example
//!
//! ```rust
//! use anomaly_watch::core::{AnalysisSession, WatchConfig};
//! use anomaly_watch::sources::parse_csv;
//!
//! # fn main() -> anomaly_watch::prelude::Result<()> {
//! let config = WatchConfig::default().with_columns("day", "count");
//! config.validate()?;
//!
//! let mut session = AnalysisSession::new(parse_csv("day,count\n2024-02-01,4\n2024-02-02,5\n"));
//! if let (Some(date), Some(value)) = (&config.date_column, &config.value_column) {
//!     session.select_columns(date, value)?;
//! }
//! let report = session.report(config.threshold)?;
//! assert_eq!(report.kept_rows, 2);
//! assert!(!report.has_anomalies());
//! # Ok(())
//! # }
//! ```

mod config;
mod report;
mod session;

pub use config::WatchConfig;
pub use report::DetectionReport;
pub use session::AnalysisSession;
