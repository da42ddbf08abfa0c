//! Tabular data sources for anomaly-watch.
//!
//! A source turns some external input into a [`Table`]: a header plus an
//! ordered list of [`RawRow`]s holding untouched cell text. No numeric or date
//! coercion happens at this layer, so the same table can be re-analysed with
//! any pair of columns.

use crate::prelude::*;
use std::collections::HashMap;
use std::fmt::Debug;

mod csv;

pub use csv::{parse_csv, CsvOptions, CsvParser, CsvSource};

/// A source that can produce a [`Table`].
///
/// Implementations own resource acquisition: they read their input fully,
/// release it, and only then hand text to a parser.
///
/// # Examples
///
/// ```rust,no_run
/// use anomaly_watch::sources::{CsvSource, TabularSource};
///
/// # fn example() -> anomaly_watch::prelude::Result<()> {
/// let source = CsvSource::new("data/sales.csv");
/// let table = source.load()?;
/// println!("{} rows from {}", table.len(), source.description());
/// # Ok(())
/// # }
/// ```
pub trait TabularSource: Debug + Send + Sync {
    /// Loads the whole source into memory.
    fn load(&self) -> Result<Table>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}

/// One data line of a tabular input, keyed by column name.
///
/// Cells that were missing on a short line are absent rather than empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw text of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Returns true if the row carries a cell for `column`.
    pub fn contains_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Number of cells present in this row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(column, raw text)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, column: &str, value: &str) {
        self.cells.insert(column.to_string(), value.to_string());
    }

    pub(crate) fn remove(&mut self, column: &str) {
        self.cells.remove(column);
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A parsed table: the header line plus every data row, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl Table {
    /// Creates a table from already-split headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    /// Header fields exactly as they appeared, duplicates included.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Distinct column names in order of first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.headers
            .iter()
            .filter(|h| seen.insert(h.as_str()))
            .cloned()
            .collect()
    }

    /// Returns true if `column` is one of the header names.
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// The data rows.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<RawRow> {
        self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_from_iter() {
        let row: RawRow = [("date", "2023-01-01"), ("value", "10")].into_iter().collect();
        assert_eq!(row.get("date"), Some("2023-01-01"));
        assert_eq!(row.get("value"), Some("10"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
        assert!(row.contains_column("value"));
    }

    #[test]
    fn test_table_columns_are_distinct() {
        let table = Table::new(
            vec!["a".into(), "b".into(), "a".into(), "c".into()],
            Vec::new(),
        );
        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.columns(), vec!["a", "b", "c"]);
        assert!(table.has_column("c"));
        assert!(!table.has_column("d"));
        assert!(table.is_empty());
    }
}
