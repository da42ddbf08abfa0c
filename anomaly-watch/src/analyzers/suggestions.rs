//! Keyword-based suggestion of the timestamp and value columns.
//!
//! This is a convenience for callers that present a column picker. It only
//! looks at header names and has no influence on detection: the detector
//! accepts any pair of columns, however they were chosen.
//!
//! ## Scoring
//!
//! A column's score is the total length of the keywords contained in its
//! lowercased name, so `"order_date"` scores 4 for `date` and `"timestamp"`
//! scores 4 + 9 for `time` and `timestamp`. The first column with the highest
//! positive score wins. Columns without any match fall back to position.
//!
//! ## Example
//!
//! ```rust
//! use anomaly_watch::analyzers::suggest_columns;
//!
//! let headers = ["id", "created_at", "total_revenue"];
//! let suggestion = suggest_columns(&headers).unwrap();
//! assert_eq!(suggestion.date_column, "created_at");
//! assert_eq!(suggestion.value_column.as_deref(), Some("total_revenue"));
//! assert!(suggestion.is_confident());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Keywords that suggest a column holds timestamps.
pub const DATE_KEYWORDS: &[&str] = &[
    "date",
    "time",
    "timestamp",
    "datetime",
    "created",
    "updated",
    "day",
    "month",
    "year",
];

/// Keywords that suggest a column holds measurements.
pub const VALUE_KEYWORDS: &[&str] = &[
    "value",
    "amount",
    "price",
    "cost",
    "revenue",
    "temperature",
    "pressure",
    "humidity",
    "speed",
    "count",
    "total",
    "sum",
    "avg",
    "mean",
];

/// Confidence above which a suggestion can be applied without asking.
pub const AUTO_SELECT_CONFIDENCE: u8 = 70;

const MAX_CONFIDENCE: u32 = 95;
const BASE_CONFIDENCE: u32 = 50;

/// A proposed `(date column, value column)` pair with a confidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSuggestion {
    /// Column most likely to hold timestamps.
    pub date_column: String,
    /// Column most likely to hold the measurement; `None` for one-column data.
    pub value_column: Option<String>,
    /// Confidence from 50 to 95.
    pub confidence: u8,
}

impl ColumnSuggestion {
    /// Whether the suggestion is strong enough to pre-select.
    pub fn is_confident(&self) -> bool {
        self.confidence > AUTO_SELECT_CONFIDENCE
    }
}

/// Scores `column` against `keywords`.
pub fn keyword_score(column: &str, keywords: &[&str]) -> usize {
    let lowered = column.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .map(|keyword| keyword.len())
        .sum()
}

/// Suggests the date and value columns from header names.
///
/// Returns `None` when there are no columns to choose from.
#[instrument(skip(columns), fields(column_count = columns.len()))]
pub fn suggest_columns<S: AsRef<str>>(columns: &[S]) -> Option<ColumnSuggestion> {
    if columns.is_empty() {
        return None;
    }

    let (date_match, date_score) = best_match(columns.iter().map(AsRef::as_ref), DATE_KEYWORDS);
    let date_column = date_match.unwrap_or_else(|| columns[0].as_ref()).to_string();

    let (value_match, value_score) = best_match(
        columns
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| *c != date_column),
        VALUE_KEYWORDS,
    );
    let value_column = value_match
        .or_else(|| {
            columns
                .iter()
                .map(AsRef::as_ref)
                .find(|c| *c != date_column)
        })
        .map(str::to_string);

    let raw_confidence = (date_score + value_score) as u32 * 10 + BASE_CONFIDENCE;
    let confidence = raw_confidence.min(MAX_CONFIDENCE) as u8;

    debug!(
        date_column = %date_column,
        value_column = ?value_column,
        confidence,
        "Suggested columns"
    );

    Some(ColumnSuggestion {
        date_column,
        value_column,
        confidence,
    })
}

fn best_match<'a>(
    columns: impl Iterator<Item = &'a str>,
    keywords: &[&str],
) -> (Option<&'a str>, usize) {
    let mut best = None;
    let mut best_score = 0;
    for column in columns {
        let score = keyword_score(column, keywords);
        if score > best_score {
            best = Some(column);
            best_score = score;
        }
    }
    (best, best_score)
}
