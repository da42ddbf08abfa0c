//! Rendering of detection reports.
//!
//! This module provides formatters that turn a [`DetectionReport`] into JSON
//! for other tools, colorized text for terminals, or Markdown for documents.
//!
//! # Examples
//!
//! ```rust
//! use anomaly_watch::core::AnalysisSession;
//! use anomaly_watch::formatters::{FormatterConfig, HumanFormatter, ReportFormatter};
//! use anomaly_watch::sources::parse_csv;
//!
//! # fn main() -> anomaly_watch::prelude::Result<()> {
//! let mut session = AnalysisSession::new(parse_csv("date,value\n2024-01-01,1\n2024-01-02,2\n"));
//! session.select_columns("date", "value")?;
//! let report = session.report(2.5)?;
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::minimal());
//! let output = formatter.format(&report)?;
//! assert!(output.contains("No anomalies detected"));
//! # Ok(())
//! # }
//! ```

use crate::analyzers::{format_percent, AnomalyType, DataPoint, Highlight};
use crate::core::DetectionReport;
use crate::prelude::*;
use chrono::{DateTime, Timelike, Utc};
use std::fmt::Write;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

/// Configuration options for formatting detection reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// List only anomalous points instead of the whole series
    pub anomalies_only: bool,
    /// Include mean, standard deviation and range
    pub include_statistics: bool,
    /// Include highlights and the narrative summary
    pub include_insights: bool,
    /// Include the point listing
    pub include_points: bool,
    /// Maximum number of points to list (-1 for all)
    pub max_points: i32,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the generation time
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            anomalies_only: false,
            include_statistics: true,
            include_insights: true,
            include_points: true,
            max_points: -1,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            anomalies_only: true,
            include_statistics: false,
            include_insights: true,
            include_points: false,
            max_points: 0,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a configuration suitable for CI logs.
    pub fn ci() -> Self {
        Self {
            anomalies_only: true,
            include_statistics: true,
            include_insights: true,
            include_points: true,
            max_points: 50,
            use_colors: false,
            include_timestamps: true,
        }
    }

    /// Sets whether to list only anomalous points.
    pub fn with_anomalies_only(mut self, anomalies_only: bool) -> Self {
        self.anomalies_only = anomalies_only;
        self
    }

    /// Sets whether to include series statistics.
    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    /// Sets the maximum number of points to list.
    pub fn with_max_points(mut self, max: i32) -> Self {
        self.max_points = max;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether to include the generation time.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    /// Points to list, in timestamp order, and how many were left out.
    fn select_points<'a>(&self, report: &'a DetectionReport) -> (Vec<&'a DataPoint>, usize) {
        let candidates: Vec<&DataPoint> = report
            .points
            .iter()
            .filter(|p| !self.anomalies_only || p.is_anomaly())
            .collect();
        let total = candidates.len();
        let shown: Vec<&DataPoint> = if self.max_points < 0 {
            candidates
        } else {
            candidates.into_iter().take(self.max_points as usize).collect()
        };
        let hidden = total - shown.len();
        (shown, hidden)
    }
}

/// Trait for rendering detection reports.
///
/// # Examples
///
/// ```rust
/// use anomaly_watch::core::DetectionReport;
/// use anomaly_watch::formatters::ReportFormatter;
///
/// struct CountFormatter;
///
/// impl ReportFormatter for CountFormatter {
///     fn format(&self, report: &DetectionReport) -> anomaly_watch::prelude::Result<String> {
///         Ok(format!("{} anomalies", report.anomaly_count()))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report.
    fn format(&self, report: &DetectionReport) -> Result<String>;

    /// Formats a report with a custom configuration.
    fn format_with_config(
        &self,
        report: &DetectionReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

/// Formats reports as JSON.
///
/// The point listing honours the configuration; statistics and insights
/// are always present so consumers see a stable shape.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &DetectionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DetectionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_report_for_config(report, config);
        let output = if self.pretty {
            serde_json::to_string_pretty(&filtered)
        } else {
            serde_json::to_string(&filtered)
        };
        output.map_err(|e| {
            AnomalyWatchError::Serialization(format!("Failed to serialize report to JSON: {e}"))
        })
    }
}

/// Formats reports as console text, optionally colorized.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &DetectionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DetectionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let paint = |color: &str, text: String| -> String {
            if config.use_colors {
                format!("{color}{text}{RESET}")
            } else {
                text
            }
        };

        writeln!(output)?;
        if report.has_anomalies() {
            let noun = plural(report.anomaly_count(), "anomaly", "anomalies");
            writeln!(
                output,
                "⚠️  {}",
                paint(YELLOW, format!("{} {noun} detected", report.anomaly_count()))
            )?;
        } else {
            writeln!(output, "✅ {}", paint(GREEN, "No anomalies detected".to_string()))?;
        }

        writeln!(output)?;
        writeln!(output, "Columns: {} / {}", report.date_column, report.value_column)?;
        writeln!(
            output,
            "Threshold: {:.2} ({} sensitivity)",
            report.threshold, report.sensitivity
        )?;
        writeln!(
            output,
            "Rows: {} read, {} analyzed, {} dropped",
            report.input_rows,
            report.kept_rows,
            report.dropped_rows()
        )?;
        if config.include_timestamps {
            writeln!(output, "Generated: {}", report.generated_at.to_rfc3339())?;
        }

        if config.include_statistics {
            if let Some(stats) = &report.statistics {
                writeln!(output)?;
                writeln!(output, "📊 Series Statistics:")?;
                writeln!(output, "   Mean: {:.3}", stats.mean)?;
                writeln!(output, "   Std Dev: {:.3}", stats.std_dev)?;
                writeln!(output, "   Min: {:.3}", stats.min)?;
                writeln!(output, "   Max: {:.3}", stats.max)?;
            }
        }

        if config.include_insights && report.has_anomalies() {
            let insights = &report.insights;
            writeln!(output)?;
            writeln!(
                output,
                "🔺 Highest Spikes ({}):",
                insights.spike_count
            )?;
            write_human_highlights(&mut output, &insights.top_spikes, |t| paint(RED, t))?;
            writeln!(output, "🔻 Largest Dips ({}):", insights.dip_count)?;
            write_human_highlights(&mut output, &insights.top_dips, |t| paint(BLUE, t))?;
        }
        if config.include_insights {
            writeln!(output)?;
            writeln!(output, "📝 {}", report.insights.narrative)?;
        }

        if config.include_points {
            let (points, hidden) = config.select_points(report);
            if !points.is_empty() {
                writeln!(output)?;
                if config.anomalies_only {
                    writeln!(output, "🔍 Anomalies:")?;
                } else {
                    writeln!(output, "📈 Series:")?;
                }
                for point in points {
                    let line = format!(
                        "   {:<20} {:>14.2}  z={:>6.2}  {}",
                        format_timestamp(point.timestamp()),
                        point.value(),
                        point.z_score(),
                        type_label(point.anomaly_type())
                    );
                    let line = match point.anomaly_type() {
                        AnomalyType::Spike => paint(RED, line),
                        AnomalyType::Dip => paint(BLUE, line),
                        AnomalyType::None => line,
                    };
                    writeln!(output, "{}", line.trim_end())?;
                }
            }
            if hidden > 0 {
                writeln!(
                    output,
                    "   ... and {hidden} more points (use --max-points to show more)"
                )?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Formats reports as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &DetectionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &DetectionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);

        if report.has_anomalies() {
            writeln!(
                output,
                "{h} ⚠️ Anomaly Report - {} {}",
                report.anomaly_count(),
                plural(report.anomaly_count(), "anomaly", "anomalies")
            )?;
        } else {
            writeln!(output, "{h} ✅ Anomaly Report - No anomalies")?;
        }

        writeln!(output)?;
        writeln!(output, "**Date column:** {}", report.date_column)?;
        writeln!(output, "**Value column:** {}", report.value_column)?;
        writeln!(
            output,
            "**Threshold:** {:.2} ({} sensitivity)",
            report.threshold, report.sensitivity
        )?;
        if config.include_timestamps {
            writeln!(output, "**Generated:** {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(output)?;
        writeln!(output, "{h}# Summary")?;
        writeln!(output)?;
        writeln!(output, "| Metric | Value |")?;
        writeln!(output, "|--------|-------|")?;
        writeln!(output, "| Rows Read | {} |", report.input_rows)?;
        writeln!(output, "| Rows Analyzed | {} |", report.kept_rows)?;
        writeln!(output, "| Spikes | {} |", report.insights.spike_count)?;
        writeln!(output, "| Dips | {} |", report.insights.dip_count)?;
        if config.include_statistics {
            if let Some(stats) = &report.statistics {
                writeln!(output, "| Mean | {:.3} |", stats.mean)?;
                writeln!(output, "| Std Dev | {:.3} |", stats.std_dev)?;
                writeln!(output, "| Min | {:.3} |", stats.min)?;
                writeln!(output, "| Max | {:.3} |", stats.max)?;
            }
        }

        if config.include_insights {
            writeln!(output)?;
            writeln!(output, "{h}# Insights")?;
            writeln!(output)?;
            writeln!(output, "{}", report.insights.narrative)?;
            write_markdown_highlights(&mut output, "Highest Spikes", &report.insights.top_spikes)?;
            write_markdown_highlights(&mut output, "Largest Dips", &report.insights.top_dips)?;
        }

        if config.include_points {
            let (points, hidden) = config.select_points(report);
            if !points.is_empty() {
                writeln!(output)?;
                if config.anomalies_only {
                    writeln!(output, "{h}# Anomalies")?;
                } else {
                    writeln!(output, "{h}# Series")?;
                }
                writeln!(output)?;
                writeln!(output, "| Timestamp | Value | Z-Score | Type |")?;
                writeln!(output, "|-----------|-------|---------|------|")?;
                for point in points {
                    writeln!(
                        output,
                        "| {} | {:.2} | {:.2} | {} |",
                        format_timestamp(point.timestamp()),
                        point.value(),
                        point.z_score(),
                        point.anomaly_type()
                    )?;
                }
            }
            if hidden > 0 {
                writeln!(output)?;
                writeln!(
                    output,
                    "> **Note:** {hidden} additional points not shown in this report."
                )?;
            }
        }

        Ok(output)
    }
}

/// Date-only for midnight timestamps, RFC 3339 otherwise.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    if timestamp.num_seconds_from_midnight() == 0 && timestamp.nanosecond() == 0 {
        timestamp.format("%Y-%m-%d").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

fn type_label(anomaly_type: AnomalyType) -> &'static str {
    match anomaly_type {
        AnomalyType::Spike => "SPIKE",
        AnomalyType::Dip => "DIP",
        AnomalyType::None => "",
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn describe_change(highlight: &Highlight) -> String {
    highlight
        .percent_change
        .map(format_percent)
        .unwrap_or_else(|| "n/a".to_string())
}

fn write_human_highlights(
    output: &mut String,
    highlights: &[Highlight],
    paint: impl Fn(String) -> String,
) -> Result<()> {
    if highlights.is_empty() {
        writeln!(output, "   none")?;
        return Ok(());
    }
    for highlight in highlights {
        let line = format!(
            "   {}  {:.2} ({})  z={:.2}",
            format_timestamp(highlight.timestamp),
            highlight.value,
            describe_change(highlight),
            highlight.z_score
        );
        writeln!(output, "{}", paint(line))?;
    }
    Ok(())
}

fn write_markdown_highlights(
    output: &mut String,
    title: &str,
    highlights: &[Highlight],
) -> Result<()> {
    if highlights.is_empty() {
        return Ok(());
    }
    writeln!(output)?;
    writeln!(output, "**{title}:**")?;
    writeln!(output)?;
    for highlight in highlights {
        writeln!(
            output,
            "- {}: {:.2} ({}, z-score {:.2})",
            format_timestamp(highlight.timestamp),
            highlight.value,
            describe_change(highlight),
            highlight.z_score
        )?;
    }
    Ok(())
}

/// Copy of `report` reduced to what `config` asks for.
fn filter_report_for_config(report: &DetectionReport, config: &FormatterConfig) -> DetectionReport {
    let mut filtered = report.clone();
    if config.include_points {
        let (points, _) = config.select_points(report);
        filtered.points = points.into_iter().cloned().collect();
    } else {
        filtered.points.clear();
    }
    filtered
}
