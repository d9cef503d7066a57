//! In-memory delimited tables with typed cell access.
//!
//! Survey exports are small enough to hold in memory whole. Cells are kept as
//! text and parsed on access, so a malformed value is reported against the
//! exact table, column and row it came from.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WrangleError, WrangleResult};

/// Cell spellings treated as "no value".
const MISSING_MARKERS: &[&str] = &["", "NA", "NaN", "nan", "N/A"];

/// Character encoding of a delimited export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// ISO-8859-1, which maps every byte onto the code point of the same value.
    #[default]
    Latin1,
    Utf8,
}

impl TextEncoding {
    /// Decode raw file bytes into text.
    pub fn decode(self, bytes: Vec<u8>, path: &Path) -> WrangleResult<String> {
        match self {
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            TextEncoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| WrangleError::Encoding { path: path.into() })
            }
        }
    }
}

/// A header-indexed table of optional text cells.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from a header and rows, normalising missing-value markers.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(position);
        }
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(normalize_cell).collect())
            .collect();
        Self { name: name.into(), headers, index, rows }
    }

    /// Read a delimited file with a header row.
    pub fn read_path(
        name: impl Into<String>,
        path: &Path,
        delimiter: u8,
        encoding: TextEncoding,
    ) -> WrangleResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| WrangleError::io(path, e))?;
        let text = encoding.decode(bytes, path)?;
        Self::parse(name, &text, delimiter, path)
    }

    /// Parse already-decoded delimited text. `origin` is only used in errors.
    pub fn parse(
        name: impl Into<String>,
        text: &str,
        delimiter: u8,
        origin: &Path,
    ) -> WrangleResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| WrangleError::csv(origin, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| WrangleError::csv(origin, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(name, headers, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Position of a column, or a `MissingColumn` error.
    pub fn column_index(&self, column: &str) -> WrangleResult<usize> {
        self.index.get(column).copied().ok_or_else(|| WrangleError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Fail fast if any of `columns` is absent.
    pub fn require_columns(&self, columns: &[&str]) -> WrangleResult<()> {
        for column in columns {
            self.column_index(column)?;
        }
        Ok(())
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|cells| Row { table: self, position, cells })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(position, cells)| Row { table: self, position, cells })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    position: usize,
    cells: &'a [Option<String>],
}

impl<'a> Row<'a> {
    /// Zero-based position of the row in its table.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Raw text of a cell; `None` when missing.
    pub fn text(&self, column: &str) -> WrangleResult<Option<&'a str>> {
        let index = self.table.column_index(column)?;
        Ok(self.cells.get(index).and_then(|c| c.as_deref()))
    }

    /// Cell parsed as a float.
    pub fn number(&self, column: &str) -> WrangleResult<Option<f64>> {
        match self.text(column)? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.invalid_number(column, raw)),
        }
    }

    /// Cell parsed as an integer. Integral floats such as `3.0` are accepted.
    pub fn int(&self, column: &str) -> WrangleResult<Option<i64>> {
        match self.text(column)? {
            None => Ok(None),
            Some(raw) => parse_int(raw).map(Some).ok_or_else(|| self.invalid_number(column, raw)),
        }
    }

    /// Integer cell that must be present.
    pub fn require_int(&self, column: &str) -> WrangleResult<i64> {
        self.int(column)?.ok_or_else(|| WrangleError::MissingValue {
            table: self.table.name.clone(),
            column: column.to_string(),
            row: self.position + 1,
        })
    }

    /// Cell normalised as a record key (see [`normalize_key`]).
    pub fn key(&self, column: &str) -> WrangleResult<Option<String>> {
        Ok(self.text(column)?.map(normalize_key))
    }

    fn invalid_number(&self, column: &str, raw: &str) -> WrangleError {
        WrangleError::InvalidNumber {
            table: self.table.name.clone(),
            column: column.to_string(),
            row: self.position + 1,
            value: raw.to_string(),
        }
    }
}

/// Parse an integer, accepting integral float spellings (`12.0`).
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Canonical spelling of an id cell, so `17` and `17.0` join as the same key.
pub fn normalize_key(raw: &str) -> String {
    match parse_int(raw) {
        Some(value) => value.to_string(),
        None => raw.trim().to_string(),
    }
}

fn normalize_cell(cell: String) -> Option<String> {
    if MISSING_MARKERS.contains(&cell.trim()) {
        None
    } else {
        Some(cell)
    }
}
