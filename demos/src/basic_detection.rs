//! Basic detection example.
//!
//! This example shows how to:
//! - Load a CSV file and let anomaly-watch pick the columns
//! - Run detection through an analysis session
//! - Print the report as text and as Markdown
//!
//! Run with:
//! ```bash
//! cargo run --example basic_detection
//! ```

use anomaly_watch::formatters::{HumanFormatter, MarkdownFormatter};
use anomaly_watch::prelude::*;
use anomaly_watch::sources::CsvSource;
use anomaly_watch_demos::write_sample_csv;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("anomaly_watch=info")
        .init();

    let file = write_sample_csv()?;
    let mut session = AnalysisSession::from_source(&CsvSource::new(file.path()))?;

    let suggestion = session
        .suggest_columns()
        .ok_or("sample file has no header")?;
    let value_column = suggestion
        .value_column
        .clone()
        .ok_or("sample file has a single column")?;
    println!(
        "Suggested columns: {} / {} (confidence {}%)",
        suggestion.date_column, value_column, suggestion.confidence
    );

    session.select_columns(&suggestion.date_column, &value_column)?;
    let report = session.report(2.5)?;

    let config = FormatterConfig::default().with_anomalies_only(true);
    println!("{}", HumanFormatter::with_config(config.clone()).format(&report)?);
    println!("{}", MarkdownFormatter::with_config(config).format(&report)?);

    Ok(())
}
