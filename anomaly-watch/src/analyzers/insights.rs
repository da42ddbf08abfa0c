//! Human-oriented summary of a detection run.
//!
//! [`InsightsSummary`] condenses classified points into counts, the most
//! pronounced spikes and dips, and a short narrative. Deviations are reported
//! relative to a baseline taken from the anomalies themselves: the upper
//! median of the anomalous values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::anomaly::{AnomalyType, DataPoint};

/// Number of spikes and dips highlighted by default.
pub const DEFAULT_TOP_HIGHLIGHTS: usize = 2;

/// Qualitative sensitivity of a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    /// Threshold of 2.0 or below.
    VeryHigh,
    /// Up to 2.5.
    High,
    /// Up to 3.0.
    Medium,
    /// Above 3.0.
    Low,
}

impl SensitivityLevel {
    /// Buckets a threshold. Lower thresholds flag more points.
    pub fn from_threshold(threshold: f64) -> Self {
        if threshold <= 2.0 {
            SensitivityLevel::VeryHigh
        } else if threshold <= 2.5 {
            SensitivityLevel::High
        } else if threshold <= 3.0 {
            SensitivityLevel::Medium
        } else {
            SensitivityLevel::Low
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            SensitivityLevel::VeryHigh => "Very High",
            SensitivityLevel::High => "High",
            SensitivityLevel::Medium => "Medium",
            SensitivityLevel::Low => "Low",
        }
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One highlighted anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub z_score: f64,
    /// Change relative to the baseline, in percent. `None` for a zero baseline.
    pub percent_change: Option<f64>,
}

/// Counts, highlights and narrative for a classified series.
///
/// # Example
///
/// ```rust
/// use anomaly_watch::analyzers::{detect_anomalies, InsightsSummary};
/// use anomaly_watch::sources::parse_csv;
///
/// let table = parse_csv(
///     "date,value\n2023-01-01,10\n2023-01-02,11\n2023-01-03,9\n2023-01-04,10\n\
///      2023-01-05,11\n2023-01-06,9\n2023-01-07,10\n2023-01-08,95\n",
/// );
/// let points = detect_anomalies(table.rows(), "date", "value", 2.5);
/// let insights = InsightsSummary::from_points(&points, 2);
///
/// assert_eq!(insights.spike_count, 1);
/// assert!(insights.narrative.starts_with("1 anomaly detected"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsSummary {
    pub anomaly_count: usize,
    pub spike_count: usize,
    pub dip_count: usize,
    /// Upper median of the anomalous values, `0.0` without anomalies.
    pub baseline: f64,
    /// Strongest spikes first.
    pub top_spikes: Vec<Highlight>,
    /// Deepest dips first.
    pub top_dips: Vec<Highlight>,
    pub narrative: String,
}

impl InsightsSummary {
    /// Summarizes `points`, keeping at most `top_n` highlights per direction.
    pub fn from_points(points: &[DataPoint], top_n: usize) -> Self {
        let mut spikes: Vec<&DataPoint> = points
            .iter()
            .filter(|p| p.anomaly_type() == AnomalyType::Spike)
            .collect();
        let mut dips: Vec<&DataPoint> = points
            .iter()
            .filter(|p| p.anomaly_type() == AnomalyType::Dip)
            .collect();
        spikes.sort_by(|a, b| b.z_score().total_cmp(&a.z_score()));
        dips.sort_by(|a, b| a.z_score().total_cmp(&b.z_score()));

        let baseline = anomaly_baseline(points);
        let highlight = |p: &&DataPoint| Highlight {
            timestamp: p.timestamp(),
            value: p.value(),
            z_score: p.z_score(),
            percent_change: percent_change(p.value(), baseline),
        };

        let top_spikes: Vec<Highlight> = spikes.iter().take(top_n).map(highlight).collect();
        let top_dips: Vec<Highlight> = dips.iter().take(top_n).map(highlight).collect();
        let anomaly_count = spikes.len() + dips.len();

        let narrative = narrate(
            anomaly_count,
            spikes.first().map(highlight).as_ref(),
            dips.first().map(highlight).as_ref(),
        );

        Self {
            anomaly_count,
            spike_count: spikes.len(),
            dip_count: dips.len(),
            baseline,
            top_spikes,
            top_dips,
            narrative,
        }
    }

    /// Whether any point was flagged.
    pub fn has_anomalies(&self) -> bool {
        self.anomaly_count > 0
    }
}

/// Upper median of the anomalous values in `points`, or `0.0` if none.
pub fn anomaly_baseline(points: &[DataPoint]) -> f64 {
    let mut values: Vec<f64> = points
        .iter()
        .filter(|p| p.is_anomaly())
        .map(DataPoint::value)
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values[values.len() / 2]
}

/// Percent change of `value` against `baseline`.
pub fn percent_change(value: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    Some((value - baseline) / baseline * 100.0)
}

/// Renders a percent change with an explicit sign for increases.
pub fn format_percent(change: f64) -> String {
    if change > 0.0 {
        format!("+{change:.1}%")
    } else {
        format!("{change:.1}%")
    }
}

fn narrate(anomaly_count: usize, top_spike: Option<&Highlight>, top_dip: Option<&Highlight>) -> String {
    if anomaly_count == 0 {
        return "No anomalies detected in the series.".to_string();
    }

    let noun = if anomaly_count == 1 { "anomaly" } else { "anomalies" };
    let mut text = format!("{anomaly_count} {noun} detected in the series.");

    if let Some(spike) = top_spike {
        text.push_str(&format!(
            " The most significant spike occurred on {} with {}.",
            spike.timestamp.format("%Y-%m-%d"),
            describe_deviation(spike, "deviation from baseline"),
        ));
    }
    if let Some(dip) = top_dip {
        text.push_str(&format!(
            " The largest drop was observed on {} showing {}.",
            dip.timestamp.format("%Y-%m-%d"),
            describe_deviation(dip, "decrease"),
        ));
    }
    text
}

fn describe_deviation(highlight: &Highlight, noun: &str) -> String {
    match highlight.percent_change {
        Some(change) => format!("a {} {noun}", format_percent(change)),
        None => format!("a z-score of {:.2}", highlight.z_score),
    }
}
