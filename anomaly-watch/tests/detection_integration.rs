//! End-to-end tests: file on disk to formatted report.

use anomaly_watch::analyzers::{detect_anomalies, suggest_columns, AnomalyType, ZScoreDetector};
use anomaly_watch::formatters::{HumanFormatter, JsonFormatter, MarkdownFormatter};
use anomaly_watch::prelude::*;
use anomaly_watch::sources::{parse_csv, CsvOptions, CsvSource};
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const SCENARIO_A: &str = "date,value\n\
    2023-01-01,100\n\
    2023-01-02,102\n\
    2023-01-03,98\n\
    2023-01-04,500\n";

fn create_test_csv(data: &str) -> Result<NamedTempFile> {
    let mut temp_file = NamedTempFile::with_suffix(".csv")?;
    write!(temp_file, "{data}")?;
    temp_file.flush()?;
    Ok(temp_file)
}

/// Hourly readings around 20 degrees with one heat spike and one cold dip.
fn sensor_csv() -> String {
    let mut text = String::from("timestamp,sensor,temperature\n");
    for hour in 0..48u32 {
        let reading = match hour {
            30 => 35.0,
            12 => 5.0,
            h => 20.0 + f64::from(h % 3) * 0.5,
        };
        let day = 1 + hour / 24;
        text.push_str(&format!(
            "2024-03-{day:02}T{:02}:00:00Z,s-1,{reading}\n",
            hour % 24
        ));
    }
    text
}

#[test]
fn test_scenario_a_exact_statistics() {
    let table = parse_csv(SCENARIO_A);
    let points = detect_anomalies(table.rows(), "date", "value", 2.5);

    assert_eq!(points.len(), 4);
    assert!(points.iter().all(|p| !p.is_anomaly()));

    let std_dev = 30_002f64.sqrt();
    assert!((points[3].z_score() - 300.0 / std_dev).abs() < 1e-12);
    assert!((points[3].z_score() - 1.732).abs() < 1e-3);
    assert!((points[0].z_score() + 100.0 / std_dev).abs() < 1e-12);

    let flagged = detect_anomalies(table.rows(), "date", "value", 1.7);
    assert_eq!(flagged[3].anomaly_type(), AnomalyType::Spike);
}

#[test]
fn test_scenario_b_shuffled_input_comes_back_sorted() {
    let mut lines: Vec<String> = (1..=28)
        .map(|d| format!("2023-02-{d:02},{}", 50 + d))
        .collect();
    lines.shuffle(&mut StdRng::seed_from_u64(7));
    let text = format!("date,value\n{}\n", lines.join("\n"));

    let table = parse_csv(&text);
    let points = detect_anomalies(table.rows(), "date", "value", 2.5);

    assert_eq!(points.len(), 28);
    for (i, point) in points.iter().enumerate() {
        let expected = Utc.with_ymd_and_hms(2023, 2, i as u32 + 1, 0, 0, 0).unwrap();
        assert_eq!(point.timestamp(), expected);
        assert_eq!(point.value(), 51.0 + i as f64);
    }
}

#[test]
fn test_scenario_c_single_row() {
    let table = parse_csv("date,value\n2023-01-01,100.5");
    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.get("date"), Some("2023-01-01"));
    assert_eq!(row.get("value"), Some("100.5"));

    // a single point has no spread
    let points = ZScoreDetector::default().detect(table.rows(), "date", "value");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].z_score(), 0.0);
}

#[test]
fn test_sensor_file_end_to_end() -> Result<()> {
    let file = create_test_csv(&sensor_csv())?;
    let mut session = AnalysisSession::from_source(&CsvSource::new(file.path()))?;

    let suggestion = session.suggest_columns().expect("header present");
    assert_eq!(suggestion.date_column, "timestamp");
    assert_eq!(suggestion.value_column.as_deref(), Some("temperature"));

    session.select_columns("timestamp", "temperature")?;
    let report = session.report(2.5)?;

    assert_eq!(report.input_rows, 48);
    assert_eq!(report.kept_rows, 48);
    let spikes: Vec<_> = report.points_of_type(AnomalyType::Spike).collect();
    let dips: Vec<_> = report.points_of_type(AnomalyType::Dip).collect();
    assert_eq!(spikes.len(), 1);
    assert_eq!(dips.len(), 1);
    assert_eq!(spikes[0].value(), 35.0);
    assert_eq!(dips[0].value(), 5.0);
    assert_eq!(
        dips[0].timestamp(),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    );

    let human = HumanFormatter::with_config(FormatterConfig::default().with_colors(false))
        .format(&report)?;
    assert!(human.contains("2 anomalies detected"));
    assert!(human.contains("2024-03-02T06:00:00Z"));

    let markdown = MarkdownFormatter::new().format(&report)?;
    assert!(markdown.contains("| Spikes | 1 |"));
    assert!(markdown.contains("| Dips | 1 |"));

    let json = JsonFormatter::with_config(FormatterConfig::default().with_anomalies_only(true))
        .format(&report)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["points"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["points"][0]["anomaly_type"], "dip");
    Ok(())
}

#[test]
fn test_messy_file_drops_unusable_rows() -> Result<()> {
    let file = create_test_csv(
        "  date , value \n\
         \n\
         2023-01-03,98\n\
         not-a-date,100\n\
         2023-01-01,100\n\
         2023-01-05,\n\
         2023-01-02,12abc\n\
         2023-01-04,500,extra\n\
         2023-01-02,102\n\
         2023-01-06\n",
    )?;
    let table = CsvSource::new(file.path()).load()?;
    assert_eq!(table.headers(), ["date", "value"]);
    assert_eq!(table.len(), 8);

    let points = detect_anomalies(table.rows(), "date", "value", 2.5);
    let values: Vec<f64> = points.iter().map(|p| p.value()).collect();
    // "12abc" keeps its leading number; the equal 2023-01-02 stamps stay in input order
    assert_eq!(values, vec![100.0, 12.0, 102.0, 98.0, 500.0]);
    Ok(())
}

#[test]
fn test_unit_suffixed_readings_are_kept() {
    let table = parse_csv("date,temp\n2023-01-01,21.5C\n2023-01-02,22.0C\n2023-01-03,12abc\n");
    let points = detect_anomalies(table.rows(), "date", "temp", 2.5);
    let values: Vec<f64> = points.iter().map(|p| p.value()).collect();
    assert_eq!(values, vec![21.5, 22.0, 12.0]);
}

#[test]
fn test_tab_delimited_source() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("readings.tsv");
    std::fs::write(&path, "when\tamount\n2024-01-01\t3\n2024-01-02\t4\n")?;

    let source = CsvSource::with_options(&path, CsvOptions::default().with_delimiter(b'\t'));
    let table = source.load()?;
    let suggestion = suggest_columns(table.headers()).expect("two columns");
    assert_eq!(suggestion.value_column.as_deref(), Some("amount"));
    // "when" matches no keyword, so the date column falls back to position
    assert_eq!(suggestion.date_column, "when");
    assert_eq!(detect_anomalies(table.rows(), "when", "amount", 2.5).len(), 2);
    Ok(())
}

#[test]
fn test_unknown_columns() -> Result<()> {
    let table = parse_csv(SCENARIO_A);
    assert!(detect_anomalies(table.rows(), "day", "value", 2.5).is_empty());

    let mut session = AnalysisSession::new(table);
    let err = session.select_columns("day", "value").unwrap_err();
    assert!(matches!(err, AnomalyWatchError::ColumnNotFound { .. }));
    Ok(())
}

#[test]
fn test_config_file_drives_run() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("watch.json");
    std::fs::write(
        &config_path,
        r#"{ "threshold": 1.5, "date_column": "date", "value_column": "value", "top_highlights": 1 }"#,
    )?;
    let config = WatchConfig::from_file(&config_path)?;
    config.validate()?;

    let data = create_test_csv(SCENARIO_A)?;
    let source = CsvSource::with_options(data.path(), config.csv_options()?);
    let mut session = AnalysisSession::from_source(&source)?.with_top_highlights(config.top_highlights);
    session.select_columns("date", "value")?;

    let report = session.report(config.threshold)?;
    assert_eq!(report.anomaly_count(), 1);
    assert_eq!(report.insights.top_spikes.len(), 1);
    assert_eq!(report.insights.baseline, 500.0);
    Ok(())
}

#[test]
fn test_missing_file() {
    let err = AnalysisSession::from_source(&CsvSource::new("/nonexistent/series.csv")).unwrap_err();
    assert!(matches!(err, AnomalyWatchError::DataSource { .. }));
}
