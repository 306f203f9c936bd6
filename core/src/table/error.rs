//! Error types for table reading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The input file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Reading a line failed part-way through the input.
    #[error("failed to read line {line}: {source}")]
    Read { line: usize, source: std::io::Error },
}

/// Errors from bounds-checked field access on a [`Row`](super::Row).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The row has fewer fields than the requested column needs.
    #[error("column {column} is out of range (row has {len} fields)")]
    OutOfRange { column: usize, len: usize },
    /// The field exists but did not parse as a number.
    #[error("column {column} is not numeric: {text:?}")]
    NotNumeric { column: usize, text: String },
}
