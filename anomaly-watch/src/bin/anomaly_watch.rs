//! anomaly-watch command line tool
//!
//! Reads a delimited file, detects spikes and dips in one numeric column and
//! prints a report.

use std::path::PathBuf;
use std::process::ExitCode;

use anomaly_watch::analyzers::{RECOMMENDED_MAX_THRESHOLD, RECOMMENDED_MIN_THRESHOLD};
use anomaly_watch::formatters::{HumanFormatter, JsonFormatter, MarkdownFormatter};
use anomaly_watch::log_data_op;
use anomaly_watch::logging::setup::init_logging;
use anomaly_watch::prelude::*;
use anomaly_watch::sources::CsvSource;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect spikes and dips in a CSV time series", long_about = None)]
struct Args {
    /// Delimited text file to analyze
    file: PathBuf,

    /// Column holding timestamps (suggested from the header when omitted)
    #[arg(long)]
    date_column: Option<String>,

    /// Column holding measurements (suggested from the header when omitted)
    #[arg(long)]
    value_column: Option<String>,

    /// Sensitivity in standard deviations; lower flags more points
    #[arg(long, short)]
    threshold: Option<f64>,

    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// List only anomalous points
    #[arg(long)]
    anomalies_only: bool,

    /// Maximum number of points to list (-1 for all)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    max_points: i32,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Write log events to stderr as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Log filter directives, e.g. "anomaly_watch=trace" (RUST_LOG still wins)
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_config = if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::quiet()
    }
    .with_json_format(args.log_json);
    let mut logging = log_config.to_logging_config();
    if let Some(filter) = &args.log_filter {
        logging = logging.with_env_filter(filter.clone());
    }
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&args, &log_config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, log_config: &LogConfig) -> Result<String> {
    let config = resolve_config(args)?;

    let source = CsvSource::with_options(&args.file, config.csv_options()?);
    let mut session = AnalysisSession::from_source(&source)?.with_top_highlights(config.top_highlights);
    log_data_op!(
        log_config,
        columns = session.columns().len(),
        rows = session.table().len(),
        "Read {}",
        args.file.display()
    );

    let (date_column, value_column) = resolve_columns(&session, &config)?;
    session.select_columns(&date_column, &value_column)?;

    if !(RECOMMENDED_MIN_THRESHOLD..=RECOMMENDED_MAX_THRESHOLD).contains(&config.threshold) {
        warn!(
            threshold = config.threshold,
            "Threshold is outside the recommended range {RECOMMENDED_MIN_THRESHOLD}-{RECOMMENDED_MAX_THRESHOLD}"
        );
    }

    let report = session.report(config.threshold)?;
    if report.kept_rows == 0 {
        warn!(
            date_column = %date_column,
            value_column = %value_column,
            "No row had both a parseable timestamp and value"
        );
    }

    let formatter_config = FormatterConfig::default()
        .with_anomalies_only(args.anomalies_only)
        .with_max_points(args.max_points)
        .with_colors(!args.no_color);

    let rendered = match args.format {
        OutputFormat::Human => HumanFormatter::with_config(formatter_config).format(&report),
        OutputFormat::Json => JsonFormatter::with_config(formatter_config).format(&report),
        OutputFormat::Markdown => MarkdownFormatter::with_config(formatter_config).format(&report),
    };
    rendered.with_context(|| format!("Failed to render {:?} report", args.format))
}

/// File configuration with command line flags applied on top.
fn resolve_config(args: &Args) -> Result<WatchConfig> {
    let mut config = match &args.config {
        Some(path) => WatchConfig::from_file(path)?,
        None => WatchConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if args.date_column.is_some() {
        config.date_column = args.date_column.clone();
    }
    if args.value_column.is_some() {
        config.value_column = args.value_column.clone();
    }
    config.validate()?;
    Ok(config)
}

fn resolve_columns(session: &AnalysisSession, config: &WatchConfig) -> Result<(String, String)> {
    if let (Some(date), Some(value)) = (&config.date_column, &config.value_column) {
        return Ok((date.clone(), value.clone()));
    }

    let suggestion = session.suggest_columns().ok_or_else(|| {
        AnomalyWatchError::data_source("CSV", "Input has no header line")
    })?;
    let confidence = suggestion.confidence;
    let confident = suggestion.is_confident();
    let date_column = config
        .date_column
        .clone()
        .unwrap_or(suggestion.date_column);
    let value_column = match &config.value_column {
        Some(value) => value.clone(),
        None => suggestion
            .value_column
            .filter(|v| *v != date_column)
            .or_else(|| {
                session
                    .columns()
                    .into_iter()
                    .find(|c| *c != date_column)
            })
            .ok_or_else(|| {
                AnomalyWatchError::Configuration(
                    "Input has a single column; a value column is required".to_string(),
                )
            })?,
    };

    info!(
        date_column = %date_column,
        value_column = %value_column,
        confidence,
        "Using suggested columns"
    );
    if !confident {
        warn!(
            confidence,
            "Column suggestion is a guess; pass --date-column and --value-column to be explicit"
        );
    }
    Ok((date_column, value_column))
}
