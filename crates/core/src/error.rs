//! Error type shared by every stage of the wrangling pipeline.
//!
//! Expected data edge cases (unknown demographic codes, participants missing
//! from the list-phase export) never surface here; they are folded into the
//! `violation`/`finished` flags. Everything in this enum means the input no
//! longer matches the survey instrument and the run must stop.

use std::path::PathBuf;

use thiserror::Error;

use crate::order::OrderKey;

/// Error type for loading, validating and reshaping survey exports.
#[derive(Debug, Error)]
pub enum WrangleError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed delimited file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read sheet '{sheet}' from {path}: {message}")]
    Sheet { path: PathBuf, sheet: String, message: String },

    #[error("{path} is not valid UTF-8 (configure encoding 'latin1' for legacy exports)")]
    Encoding { path: PathBuf },

    #[error("Failed to parse config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Delimiter '{delimiter}' is not a single-byte character")]
    InvalidDelimiter { delimiter: char },

    #[error("Failed to write JSON to {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' column '{column}' row {row}: expected a number, found '{value}'")]
    InvalidNumber { table: String, column: String, row: usize, value: String },

    #[error("Table '{table}' column '{column}' row {row}: required value is missing")]
    MissingValue { table: String, column: String, row: usize },

    #[error("Item list {path} line {line}: '{value}' is not an item number")]
    InvalidItemList { path: PathBuf, line: usize, value: String },

    #[error("Column family '{family}' has {found} columns; the survey layout expects {expected}")]
    ColumnCount { family: String, expected: usize, found: usize },

    #[error(
        "Lookup '{category}' matched {items} reference items but has {columns} survey columns"
    )]
    LookupLength { category: String, items: usize, columns: usize },

    #[error("Duplicate participant id '{id}' in table '{table}'")]
    DuplicateParticipant { table: String, id: String },

    #[error(
        "Participant {participant}: child count {count} exceeds the {available} child-age columns"
    )]
    ChildCountOutOfRange { participant: String, count: i64, available: usize },

    #[error("Rotation column '{column}' page {page} has no entry in the value legend")]
    UnknownRotationPage { column: String, page: i64 },

    #[error("Rotation column '{column}' maps to unrecognised label '{label}'")]
    InvalidRotationLabel { column: String, label: String },

    #[error("Shared item label '{label}' points past the {control_items} control items")]
    SharedIndexOutOfRange { label: String, control_items: usize },

    #[error("Participant {participant}: {key} appears at positions {first} and {second}")]
    DuplicateOrderKey { participant: String, key: OrderKey, first: u32, second: u32 },

    #[error("Participant {participant}: no presentation position for {key}")]
    MissingOrder { participant: String, key: OrderKey },
}

impl WrangleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WrangleError::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        WrangleError::Csv { path: path.into(), source }
    }
}

/// Convenience result type for pipeline operations.
pub type WrangleResult<T> = Result<T, WrangleError>;
