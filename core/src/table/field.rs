//! Typed table cells and rows.

use super::error::FieldError;

/// A single table cell.
///
/// Numeric conversion is attempted first; tokens that do not parse keep
/// their original text.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A value that parsed as a floating-point number.
    Number(f64),
    /// Any other token, verbatim.
    Text(String),
}

impl Field {
    /// Parse a raw token.
    ///
    /// Surrounding whitespace is ignored for the numeric attempt but kept in
    /// the text fallback.
    pub fn parse(token: &str) -> Self {
        match token.trim().parse::<f64>() {
            Ok(value) => Self::Number(value),
            Err(_) => Self::Text(token.to_owned()),
        }
    }
}

/// One data line of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    line: usize,
    fields: Vec<Field>,
}

impl Row {
    /// Create a row from its 1-based source line number and fields.
    pub fn new(line: usize, fields: Vec<Field>) -> Self {
        Self { line, fields }
    }

    /// Build a row from raw tokens, parsing each one.
    pub fn from_tokens<S: AsRef<str>>(line: usize, tokens: &[S]) -> Self {
        Self::new(line, tokens.iter().map(|t| Field::parse(t.as_ref())).collect())
    }

    /// 1-based line number in the source text.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of fields in this row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by zero-based column.
    pub fn get(&self, column: usize) -> Option<&Field> {
        self.fields.get(column)
    }

    /// Check that `column` exists, without requiring it to be numeric.
    pub fn require(&self, column: usize) -> Result<&Field, FieldError> {
        self.fields.get(column).ok_or(FieldError::OutOfRange {
            column,
            len: self.fields.len(),
        })
    }

    /// Read a numeric field.
    pub fn number(&self, column: usize) -> Result<f64, FieldError> {
        match self.require(column)? {
            Field::Number(value) => Ok(*value),
            Field::Text(text) => Err(FieldError::NotNumeric {
                column,
                text: text.clone(),
            }),
        }
    }

    /// Read `N` consecutive numeric fields starting at `start`.
    pub fn numbers<const N: usize>(&self, start: usize) -> Result<[f64; N], FieldError> {
        let mut values = [0.0; N];
        for (offset, value) in values.iter_mut().enumerate() {
            *value = self.number(start + offset)?;
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parse_number_and_text() {
        assert_eq!(Field::parse("1.5"), Field::Number(1.5));
        assert_eq!(Field::parse(" -2 "), Field::Number(-2.0));
        assert_eq!(Field::parse("1e3"), Field::Number(1000.0));
        assert_eq!(Field::parse("VTX0"), Field::Text("VTX0".into()));
        assert_eq!(Field::parse(" a "), Field::Text(" a ".into()));
        assert_eq!(Field::parse(""), Field::Text(String::new()));
    }

    #[test]
    fn test_numbers_reads_consecutive_fields() {
        let row = Row::from_tokens(2, &["id", "0", "1", "2", "3"]);
        assert_eq!(row.numbers::<3>(1).unwrap(), [0.0, 1.0, 2.0]);
        assert_eq!(row.numbers::<2>(3).unwrap(), [2.0, 3.0]);
    }

    #[test]
    fn test_number_out_of_range() {
        let row = Row::from_tokens(2, &["0", "1"]);
        assert_eq!(
            row.numbers::<3>(0),
            Err(FieldError::OutOfRange { column: 2, len: 2 })
        );
    }

    #[test]
    fn test_number_not_numeric() {
        let row = Row::from_tokens(5, &["0", "x", "2"]);
        assert_eq!(
            row.number(1),
            Err(FieldError::NotNumeric {
                column: 1,
                text: "x".into()
            })
        );
        assert!(row.require(1).is_ok());
        assert_eq!(row.line(), 5);
    }
}
