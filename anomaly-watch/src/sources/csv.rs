//! CSV text parsing and the file-backed CSV source.
//!
//! The dialect is deliberately small: one record per line, a single-byte
//! delimiter, no quoting or escaping. Blank lines are ignored wherever they
//! occur and every field is trimmed.

use super::{RawRow, Table, TabularSource};
use crate::prelude::*;
use ::csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

/// Options for configuring CSV parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvOptions {
    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Splits delimited text into a header and [`RawRow`]s.
///
/// # Examples
///
/// ```rust
/// use anomaly_watch::sources::CsvParser;
///
/// let table = CsvParser::new().parse("date,value\n2023-01-01,100.5\n");
/// assert_eq!(table.headers(), ["date", "value"]);
/// assert_eq!(table.rows()[0].get("value"), Some("100.5"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    options: CsvOptions,
}

impl CsvParser {
    /// Creates a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom options.
    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Returns the active options.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Parses `text` into a table.
    ///
    /// Never fails: input without any non-blank line yields an empty table.
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn parse(&self, text: &str) -> Table {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .delimiter(self.options.delimiter)
            .from_reader(text.as_bytes());

        let mut records = reader
            .records()
            .enumerate()
            .filter_map(|(idx, record)| match record {
                Ok(record) if is_blank(&record) => None,
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(record = idx, error = %e, "Skipping unreadable record");
                    None
                }
            });

        let headers: Vec<String> = match records.next() {
            Some(header) => header.iter().map(str::to_string).collect(),
            None => {
                debug!("Input has no non-blank lines");
                return Table::default();
            }
        };

        let rows: Vec<RawRow> = records
            .enumerate()
            .map(|(idx, record)| parse_row(&headers, &record, idx))
            .collect();

        debug!(
            columns = headers.len(),
            rows = rows.len(),
            "Parsed delimited text"
        );
        Table::new(headers, rows)
    }

    /// Reads all of `reader` as UTF-8 and parses it.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Table> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| {
            AnomalyWatchError::data_source_with_source(
                "CSV",
                "Failed to read input as UTF-8 text",
                Box::new(e),
            )
        })?;
        Ok(self.parse(&text))
    }
}

/// A line holding nothing but whitespace trims down to one empty field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

fn parse_row(headers: &[String], record: &StringRecord, idx: usize) -> RawRow {
    if record.len() != headers.len() {
        trace!(
            row = idx,
            fields = record.len(),
            columns = headers.len(),
            "Row width differs from header"
        );
    }

    let mut row = RawRow::new();
    for (i, header) in headers.iter().enumerate() {
        // A repeated header name always reflects its last position, even
        // when that position has no cell on this line.
        match record.get(i) {
            Some(value) => row.insert(header, value),
            None => row.remove(header),
        }
    }
    row
}

/// Parses comma-separated `text` with default options.
pub fn parse_csv(text: &str) -> Table {
    CsvParser::new().parse(text)
}

/// A CSV file on the local filesystem.
///
/// # Examples
///
/// ```rust,no_run
/// use anomaly_watch::sources::{CsvOptions, CsvSource, TabularSource};
///
/// # fn example() -> anomaly_watch::prelude::Result<()> {
/// let source = CsvSource::with_options(
///     "data/readings.tsv",
///     CsvOptions::default().with_delimiter(b'\t'),
/// );
/// let table = source.load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    parser: CsvParser,
}

impl CsvSource {
    /// Creates a new CSV source from a file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            parser: CsvParser::with_options(options),
        }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TabularSource for CsvSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Table> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            AnomalyWatchError::data_source_with_source(
                "CSV",
                format!("Failed to read {}", self.path.display()),
                Box::new(e),
            )
        })?;
        Ok(self.parser.parse(&text))
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }
}
