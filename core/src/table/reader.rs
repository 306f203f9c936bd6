//! Header-skipping delimited text reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::TableError;
use super::field::{Field, Row};

/// Reader configuration for delimited text tables.
///
/// The first line is always treated as a header and discarded. Blank lines
/// are skipped with a warning, since every row after the gap pairs into
/// triangles one position earlier. Double-quoted fields may contain the
/// delimiter, and `""` inside quotes is an escaped quote. A quoted field
/// cannot span lines.
#[derive(Debug, Clone, Copy)]
pub struct TableReader {
    delimiter: char,
}

impl Default for TableReader {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableReader {
    /// Create a comma-delimited reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different field delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Iterate over the data rows of `reader` in a single pass.
    pub fn rows<R: BufRead>(&self, reader: R) -> Rows<R> {
        Rows {
            reader,
            delimiter: self.delimiter,
            line: 0,
            skipped: 0,
            buf: Vec::new(),
        }
    }

    /// Read every data row from a buffered reader.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Vec<Row>, TableError> {
        self.rows(reader).collect()
    }

    /// Read every data row from in-memory text.
    pub fn read_str(&self, text: &str) -> Result<Vec<Row>, TableError> {
        self.read(text.as_bytes())
    }

    /// Open and read every data row from a file.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<Row>, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lines = self.rows(BufReader::new(file));
        let rows = lines.by_ref().collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "read {} data rows ({} blank lines skipped) from {}",
            rows.len(),
            lines.skipped_lines(),
            path.display()
        );
        Ok(rows)
    }
}

/// Single-pass iterator over the data rows of a table.
///
/// Created by [`TableReader::rows`].
pub struct Rows<R> {
    reader: R,
    delimiter: char,
    line: usize,
    skipped: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> Rows<R> {
    /// Number of blank data lines skipped so far.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Read the next raw line. Returns `Ok(false)` at end of input.
    fn next_line(&mut self) -> Result<bool, TableError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| TableError::Read {
                line: self.line + 1,
                source,
            })?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }
}

impl<R: BufRead> Iterator for Rows<R> {
    type Item = Result<Row, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_line() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => return Some(Err(err)),
            }

            // Header
            if self.line == 1 {
                continue;
            }

            // Non-UTF-8 input is decoded lossily rather than rejected
            let text = String::from_utf8_lossy(&self.buf);
            let text = text.trim_end_matches(['\n', '\r']);
            if text.trim().is_empty() {
                self.skipped += 1;
                log::warn!(
                    "line {}: skipping blank line; later rows shift to different triangles",
                    self.line
                );
                continue;
            }

            let fields = split_record(text, self.delimiter)
                .iter()
                .map(|token| Field::parse(token))
                .collect();
            return Some(Ok(Row::new(self.line, fields)));
        }
    }
}

/// Split one record into raw tokens, honouring double quotes.
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() && !quoted {
            in_quotes = true;
            quoted = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
            quoted = false;
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}
