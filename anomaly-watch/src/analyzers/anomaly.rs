//! Z-score spike and dip detection over a tabular time series.
//!
//! Detection runs in four steps, each a plain pass over the data:
//!
//! 1. **Project**: read the timestamp and value cells of every row and keep
//!    only rows where both parse. Bad rows are dropped silently.
//! 2. **Order**: stable sort by timestamp, ascending.
//! 3. **Summarize**: mean and population standard deviation of the values.
//! 4. **Classify**: score each point and compare `|z|` against the threshold.
//!
//! The output stays in timestamp order. Nothing here returns an error: a
//! dataset with no usable rows simply produces no points.
//!
//! ## Example
//!
//! ```rust
//! use anomaly_watch::analyzers::anomaly::{detect_anomalies, AnomalyType};
//! use anomaly_watch::sources::parse_csv;
//!
//! let table = parse_csv(
//!     "date,value\n\
//!      2023-01-01,10\n2023-01-02,11\n2023-01-03,9\n2023-01-04,10\n\
//!      2023-01-05,11\n2023-01-06,9\n2023-01-07,10\n2023-01-08,95\n",
//! );
//!
//! let points = detect_anomalies(table.rows(), "date", "value", 2.5);
//! let spikes: Vec<_> = points
//!     .iter()
//!     .filter(|p| p.anomaly_type() == AnomalyType::Spike)
//!     .collect();
//! assert_eq!(spikes.len(), 1);
//! assert_eq!(spikes[0].value(), 95.0);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::analyzers::statistics::SampleStatistics;
use crate::analyzers::temporal::{parse_timestamp, parse_value};
use crate::logging::truncate_field;
use crate::sources::RawRow;

/// Default sensitivity threshold, in standard deviations.
pub const DEFAULT_THRESHOLD: f64 = 2.5;

/// Lower end of the threshold range worth offering to users.
pub const RECOMMENDED_MIN_THRESHOLD: f64 = 1.5;

/// Upper end of the threshold range worth offering to users.
pub const RECOMMENDED_MAX_THRESHOLD: f64 = 3.5;

const DROPPED_CELL_LOG_LENGTH: usize = 64;

/// Direction of an anomalous point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyType {
    /// Significantly above the mean.
    Spike,
    /// Significantly below the mean.
    Dip,
    /// Within the threshold.
    None,
}

impl AnomalyType {
    /// Classifies a z-score against `threshold`.
    pub fn classify(z_score: f64, threshold: f64) -> Self {
        if z_score.abs() > threshold {
            if z_score > 0.0 {
                AnomalyType::Spike
            } else {
                AnomalyType::Dip
            }
        } else {
            AnomalyType::None
        }
    }

    /// Returns the lowercase name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Spike => "spike",
            AnomalyType::Dip => "dip",
            AnomalyType::None => "none",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(timestamp, value)` pair projected out of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// When the measurement was taken.
    pub timestamp: DateTime<Utc>,
    /// The measurement.
    pub value: f64,
}

impl Observation {
    /// Projects `row` onto the two chosen columns.
    ///
    /// Returns `None` when either cell is absent or does not parse.
    pub fn from_row(row: &RawRow, date_column: &str, value_column: &str) -> Option<Self> {
        let timestamp = parse_timestamp(row.get(date_column)?)?;
        let value = parse_value(row.get(value_column)?)?;
        Some(Self { timestamp, value })
    }
}

/// A classified point of the series.
///
/// Points are produced by the detector and are read-only afterwards; the
/// classification invariants hold for every instance:
/// `is_anomaly() == (anomaly_type() != AnomalyType::None)`, and the type
/// follows the sign of `z_score()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    timestamp: DateTime<Utc>,
    value: f64,
    is_anomaly: bool,
    anomaly_type: AnomalyType,
    z_score: f64,
}

impl DataPoint {
    fn classify(observation: Observation, stats: &SampleStatistics, threshold: f64) -> Self {
        let z_score = stats.z_score(observation.value);
        let anomaly_type = AnomalyType::classify(z_score, threshold);
        Self {
            timestamp: observation.timestamp,
            value: observation.value,
            is_anomaly: anomaly_type != AnomalyType::None,
            anomaly_type,
            z_score,
        }
    }

    /// When the measurement was taken.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The measurement.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether `|z_score|` exceeded the threshold.
    pub fn is_anomaly(&self) -> bool {
        self.is_anomaly
    }

    /// Spike, dip, or none.
    pub fn anomaly_type(&self) -> AnomalyType {
        self.anomaly_type
    }

    /// Signed distance from the mean in standard deviations.
    pub fn z_score(&self) -> f64 {
        self.z_score
    }
}

/// Projects every row, dropping the ones that do not parse, and sorts the
/// survivors by timestamp.
#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn project_observations(
    rows: &[RawRow],
    date_column: &str,
    value_column: &str,
) -> Vec<Observation> {
    let mut observations: Vec<Observation> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let observation = Observation::from_row(row, date_column, value_column);
            if observation.is_none() {
                trace!(
                    row = idx,
                    date = %truncate_field(row.get(date_column).unwrap_or_default(), DROPPED_CELL_LOG_LENGTH),
                    value = %truncate_field(row.get(value_column).unwrap_or_default(), DROPPED_CELL_LOG_LENGTH),
                    "Dropping row without a usable timestamp and value"
                );
            }
            observation
        })
        .collect();

    if observations.is_empty()
        && !rows.is_empty()
        && rows
            .iter()
            .all(|r| !r.contains_column(date_column) || !r.contains_column(value_column))
    {
        warn!(
            date_column,
            value_column, "Selected columns are absent from every row"
        );
    }

    observations.sort_by_key(|o| o.timestamp);

    debug!(
        kept = observations.len(),
        dropped = rows.len() - observations.len(),
        "Projected observations"
    );
    observations
}

/// Scores already-ordered observations against precomputed statistics.
pub fn classify_observations(
    observations: &[Observation],
    stats: &SampleStatistics,
    threshold: f64,
) -> Vec<DataPoint> {
    observations
        .iter()
        .map(|o| DataPoint::classify(*o, stats, threshold))
        .collect()
}

/// Z-score detector with a fixed sensitivity threshold.
///
/// Lower thresholds are more sensitive. The threshold is used exactly as
/// given; no range checking is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreDetector {
    threshold: f64,
}

impl ZScoreDetector {
    /// Creates a detector flagging points with `|z| > threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Runs the full pipeline over `rows`.
    #[instrument(skip(self, rows), fields(threshold = self.threshold, row_count = rows.len()))]
    pub fn detect(&self, rows: &[RawRow], date_column: &str, value_column: &str) -> Vec<DataPoint> {
        let observations = project_observations(rows, date_column, value_column);
        self.detect_observations(&observations)
    }

    /// Computes statistics for ordered observations and classifies them.
    pub fn detect_observations(&self, observations: &[Observation]) -> Vec<DataPoint> {
        let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
        let Some(stats) = SampleStatistics::compute(&values) else {
            debug!("No observations to score");
            return Vec::new();
        };

        debug!(
            mean = stats.mean,
            std_dev = stats.std_dev,
            degenerate = stats.is_degenerate(),
            threshold = self.threshold,
            "Computed series statistics"
        );

        let points = classify_observations(observations, &stats, self.threshold);
        debug!(
            anomalies = points.iter().filter(|p| p.is_anomaly()).count(),
            "Classified series"
        );
        points
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Detects spikes and dips in `rows`.
///
/// Shorthand for `ZScoreDetector::new(threshold).detect(rows, date_column, value_column)`.
pub fn detect_anomalies(
    rows: &[RawRow],
    date_column: &str,
    value_column: &str,
    threshold: f64,
) -> Vec<DataPoint> {
    ZScoreDetector::new(threshold).detect(rows, date_column, value_column)
}
