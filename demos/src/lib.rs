//! Shared sample data for the anomaly-watch demos.

use std::io::Write;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

/// Daily revenue for the first quarter of 2024 with a few injected outliers.
pub fn sample_series() -> String {
    let mut text = String::from("order_date,region,total_revenue\n");
    let dates = NaiveDate::from_ymd_opt(2024, 1, 1)
        .into_iter()
        .flat_map(|start| start.iter_days())
        .take(91);
    for (day, date) in dates.enumerate() {
        let weekly = [1.00, 0.97, 1.02, 1.05, 1.10, 0.85, 0.80][day % 7];
        let revenue = match day {
            17 => 3_950.0,
            45 => 410.0,
            46 => 5_200.0,
            _ => 1_500.0 * weekly + (day as f64) * 2.0,
        };
        text.push_str(&format!("{},north,{revenue:.2}\n", date.format("%Y-%m-%d")));
    }
    text
}

/// Writes [`sample_series`] to a temporary CSV file.
pub fn write_sample_csv() -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::with_suffix(".csv")?;
    write!(file, "{}", sample_series())?;
    file.flush()?;
    Ok(file)
}
