//! Error types for mesh buffer building.

use std::fmt;

use thiserror::Error;

use crate::table::FieldError;

/// The attribute group a column range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
    Tangent,
    Color,
    /// UV channel by index.
    Uv(u32),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::Normal => f.write_str("normal"),
            Self::Tangent => f.write_str("tangent"),
            Self::Color => f.write_str("color"),
            Self::Uv(channel) => write!(f, "uv{channel}"),
        }
    }
}

/// Errors that can occur while building mesh buffers.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A row is too short for, or has text in, a required column range.
    #[error("row {row} (line {line}): cannot read {attribute}: {source}")]
    Field {
        /// Zero-based data row index.
        row: usize,
        /// 1-based source line.
        line: usize,
        attribute: Attribute,
        source: FieldError,
    },
    /// The row count is not a multiple of three.
    #[error("{rows} rows do not form whole triangles ({remainder} trailing rows)")]
    IncompleteTriangle { rows: usize, remainder: usize },
    /// More rows than polygon vertex indices can address.
    #[error("{rows} rows exceed the maximum of {max} vertices")]
    TooManyVertices { rows: usize, max: usize },
}
