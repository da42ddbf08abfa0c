use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::{
    AnomalyType, DataPoint, InsightsSummary, SampleStatistics, SensitivityLevel,
};

/// Everything produced by one detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub date_column: String,
    pub value_column: String,
    pub threshold: f64,
    pub sensitivity: SensitivityLevel,
    /// Data rows in the input table.
    pub input_rows: usize,
    /// Rows where both cells parsed.
    pub kept_rows: usize,
    /// `None` when no row survived projection.
    pub statistics: Option<SampleStatistics>,
    /// Classified points in timestamp order.
    pub points: Vec<DataPoint>,
    pub insights: InsightsSummary,
    pub generated_at: DateTime<Utc>,
}

impl DetectionReport {
    /// Rows discarded because a cell was missing or did not parse.
    pub fn dropped_rows(&self) -> usize {
        self.input_rows - self.kept_rows
    }

    /// Flagged points in timestamp order.
    pub fn anomalies(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter().filter(|p| p.is_anomaly())
    }

    /// Points of one direction in timestamp order.
    pub fn points_of_type(&self, anomaly_type: AnomalyType) -> impl Iterator<Item = &DataPoint> {
        self.points
            .iter()
            .filter(move |p| p.anomaly_type() == anomaly_type)
    }

    pub fn anomaly_count(&self) -> usize {
        self.insights.anomaly_count
    }

    pub fn has_anomalies(&self) -> bool {
        self.insights.has_anomalies()
    }
}
