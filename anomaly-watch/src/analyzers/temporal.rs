//! Locale-agnostic parsing of raw cell text into timestamps and measurements.
//!
//! Timestamps are recognised by shape first and then handed to `chrono` with
//! the matching format list, so unrelated text is rejected without trying
//! every format. Times without an explicit offset are read as UTC.
//!
//! Supported timestamp shapes:
//! - RFC 3339 / ISO-8601 datetimes with `Z` or a numeric offset
//! - naive ISO datetimes, `T` or space separated, minutes or seconds precision
//! - `YYYY-MM-DD` and `YYYY-MM`
//! - `YYYY/MM/DD` with an optional `HH:MM[:SS]` time
//! - US-style `MM/DD/YYYY`
//!
//! Measurements keep the longest leading decimal number of the cell, so
//! unit-suffixed readings such as `21.5C` still count.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{2}")
        .expect("Hard-coded regex pattern should be valid")
});

#[allow(clippy::expect_used)]
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Hard-coded regex pattern should be valid")
});

#[allow(clippy::expect_used)]
static ISO_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}$").expect("Hard-coded regex pattern should be valid"));

#[allow(clippy::expect_used)]
static SLASH_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}( \d{1,2}:\d{2}(:\d{2})?)?$")
        .expect("Hard-coded regex pattern should be valid")
});

#[allow(clippy::expect_used)]
static US_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Hard-coded regex pattern should be valid")
});

#[allow(clippy::expect_used)]
static DECIMAL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?")
        .expect("Hard-coded regex pattern should be valid")
});

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%d %H:%MZ",
];

const SLASH_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"];

/// Parses a timestamp cell. Returns `None` for empty or unrecognised text.
///
/// ```rust
/// use anomaly_watch::analyzers::temporal::parse_timestamp;
///
/// assert!(parse_timestamp("2023-01-04").is_some());
/// assert!(parse_timestamp("2023-01-04T12:30:00+02:00").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if ISO_DATETIME.is_match(s) {
        return parse_iso_datetime(s);
    }
    if ISO_DATE.is_match(s) {
        return date_at_midnight(NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?);
    }
    if ISO_MONTH.is_match(s) {
        return date_at_midnight(NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()?);
    }
    if SLASH_YMD.is_match(s) {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
            return date_at_midnight(date);
        }
        return first_naive_match(s, SLASH_FORMATS);
    }
    if US_DATE.is_match(s) {
        return date_at_midnight(NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()?);
    }

    None
}

/// Parses a measurement cell as a finite `f64`.
///
/// Reads the longest leading decimal number (optional sign, fraction and
/// exponent) and ignores whatever follows it. Returns `None` when the cell
/// does not start with a digit or a `.` followed by one, or when the number
/// overflows to infinity.
///
/// ```rust
/// use anomaly_watch::analyzers::temporal::parse_value;
///
/// assert_eq!(parse_value(" -12.5 "), Some(-12.5));
/// assert_eq!(parse_value("21.5C"), Some(21.5));
/// assert_eq!(parse_value("abc12"), None);
/// assert_eq!(parse_value("NaN"), None);
/// ```
pub fn parse_value(raw: &str) -> Option<f64> {
    let number = DECIMAL_PREFIX.find(raw.trim())?;
    number.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    first_naive_match(s, NAIVE_DATETIME_FORMATS)
}

fn first_naive_match(s: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn date_at_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}
