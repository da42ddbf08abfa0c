//! # anomaly-watch - Spike and Dip Detection for Tabular Time Series
//!
//! anomaly-watch reads delimited text, projects a timestamp column and a
//! numeric column out of it, and flags the points whose z-score exceeds a
//! sensitivity threshold. Points above the mean are spikes, points below it
//! are dips.
//!
//! ## Quick Start
//!
//! ```rust
//! use anomaly_watch::prelude::*;
//! use anomaly_watch::sources::parse_csv;
//!
//! let table = parse_csv(
//!     "date,value\n\
//!      2023-01-01,100\n2023-01-02,102\n2023-01-03,98\n2023-01-04,500\n",
//! );
//!
//! let points = ZScoreDetector::new(1.5).detect(table.rows(), "date", "value");
//! assert_eq!(points.len(), 4);
//! assert_eq!(points[3].anomaly_type(), AnomalyType::Spike);
//! assert!((points[3].z_score() - 1.732).abs() < 1e-3);
//! ```
//!
//! ## Behaviour
//!
//! - Rows whose timestamp or value cell is missing or unparseable are dropped
//!   without raising an error.
//! - Surviving points are ordered by timestamp; equal timestamps keep input order.
//! - The spread is the population standard deviation. A series without spread
//!   scores every point `0.0` and flags nothing.
//! - A point is anomalous when `|z| > threshold`; equality is not anomalous.
//!
//! ## Architecture
//!
//! - **`sources`**: delimited text parsing and the CSV file source
//! - **`analyzers`**: value parsing, statistics, detection, column suggestions, insights
//! - **`core`**: configuration, cached analysis sessions and reports
//! - **`formatters`**: human, JSON and Markdown rendering of reports
//! - **`logging`**: `tracing-subscriber` setup
//!
//! The `anomaly-watch` binary wires these together for files on disk.

pub mod analyzers;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;
