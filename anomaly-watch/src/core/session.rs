//! Repeated detection over one loaded table.
//!
//! Interactive use changes the threshold far more often than the columns.
//! [`AnalysisSession`] projects, sorts and summarizes the selected columns
//! once and re-classifies the cached series for each threshold.

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::analyzers::{
    classify_observations, project_observations, suggest_columns, ColumnSuggestion, DataPoint,
    InsightsSummary, Observation, SampleStatistics, SensitivityLevel, DEFAULT_TOP_HIGHLIGHTS,
};
use crate::core::report::DetectionReport;
use crate::prelude::*;

#[derive(Debug, Clone)]
struct Selection {
    date_column: String,
    value_column: String,
    observations: Vec<Observation>,
    statistics: Option<SampleStatistics>,
}

/// A loaded table plus the cached projection of the selected columns.
///
/// # Example
///
/// ```rust
/// use anomaly_watch::core::AnalysisSession;
/// use anomaly_watch::sources::parse_csv;
///
/// # fn main() -> anomaly_watch::prelude::Result<()> {
/// let table = parse_csv(
///     "date,value\n2023-01-01,10\n2023-01-02,11\n2023-01-03,9\n2023-01-04,10\n\
///      2023-01-05,11\n2023-01-06,9\n2023-01-07,10\n2023-01-08,95\n",
/// );
/// let mut session = AnalysisSession::new(table);
/// session.select_columns("date", "value")?;
///
/// assert_eq!(session.detect(2.5)?.iter().filter(|p| p.is_anomaly()).count(), 1);
/// assert_eq!(session.detect(3.0)?.iter().filter(|p| p.is_anomaly()).count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    table: Table,
    selection: Option<Selection>,
    top_highlights: usize,
}

impl AnalysisSession {
    /// Starts a session over an already parsed table.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            selection: None,
            top_highlights: DEFAULT_TOP_HIGHLIGHTS,
        }
    }

    /// Loads `source` and starts a session over it.
    pub fn from_source(source: &dyn TabularSource) -> Result<Self> {
        let table = source.load()?;
        info!(
            source = %source.description(),
            rows = table.len(),
            "Loaded table"
        );
        Ok(Self::new(table))
    }

    /// Sets how many spikes and dips reports highlight.
    pub fn with_top_highlights(mut self, top_highlights: usize) -> Self {
        self.top_highlights = top_highlights;
        self
    }

    /// The loaded table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Distinct header names in first-appearance order.
    pub fn columns(&self) -> Vec<String> {
        self.table.columns()
    }

    /// Header-based guess of the columns to analyze.
    pub fn suggest_columns(&self) -> Option<ColumnSuggestion> {
        suggest_columns(&self.columns())
    }

    /// The currently selected `(date, value)` pair.
    pub fn selected_columns(&self) -> Option<(&str, &str)> {
        self.selection
            .as_ref()
            .map(|s| (s.date_column.as_str(), s.value_column.as_str()))
    }

    /// Ordered observations of the current selection.
    pub fn observations(&self) -> &[Observation] {
        self.selection
            .as_ref()
            .map(|s| s.observations.as_slice())
            .unwrap_or(&[])
    }

    /// Statistics of the current selection, `None` without usable rows.
    pub fn statistics(&self) -> Option<&SampleStatistics> {
        self.selection.as_ref().and_then(|s| s.statistics.as_ref())
    }

    /// Selects the columns to analyze.
    ///
    /// Both names must appear in the header. Selecting the current pair again
    /// keeps the cached series.
    #[instrument(skip(self))]
    pub fn select_columns(&mut self, date_column: &str, value_column: &str) -> Result<()> {
        for column in [date_column, value_column] {
            if !self.table.has_column(column) {
                return Err(AnomalyWatchError::column_not_found(column));
            }
        }

        if self.selected_columns() == Some((date_column, value_column)) {
            debug!("Column selection unchanged, reusing cached series");
            return Ok(());
        }

        let observations = project_observations(self.table.rows(), date_column, value_column);
        let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
        let statistics = SampleStatistics::compute(&values);

        self.selection = Some(Selection {
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
            observations,
            statistics,
        });
        Ok(())
    }

    /// Classifies the cached series against `threshold`.
    #[instrument(skip(self))]
    pub fn detect(&self, threshold: f64) -> Result<Vec<DataPoint>> {
        let selection = self.selection()?;
        let points = match &selection.statistics {
            Some(stats) => classify_observations(&selection.observations, stats, threshold),
            None => Vec::new(),
        };
        debug!(
            points = points.len(),
            anomalies = points.iter().filter(|p| p.is_anomaly()).count(),
            "Detection finished"
        );
        Ok(points)
    }

    /// Runs detection and bundles the result with statistics and insights.
    pub fn report(&self, threshold: f64) -> Result<DetectionReport> {
        let points = self.detect(threshold)?;
        let selection = self.selection()?;
        let insights = InsightsSummary::from_points(&points, self.top_highlights);

        Ok(DetectionReport {
            date_column: selection.date_column.clone(),
            value_column: selection.value_column.clone(),
            threshold,
            sensitivity: SensitivityLevel::from_threshold(threshold),
            input_rows: self.table.len(),
            kept_rows: selection.observations.len(),
            statistics: selection.statistics,
            points,
            insights,
            generated_at: Utc::now(),
        })
    }

    fn selection(&self) -> Result<&Selection> {
        self.selection.as_ref().ok_or_else(|| {
            AnomalyWatchError::Configuration(
                "No columns selected; call select_columns first".to_string(),
            )
        })
    }
}
