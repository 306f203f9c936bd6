//! Delimited text tables.
//!
//! This module provides:
//! - [`Field`] - A single cell, parsed eagerly into a number or kept as text
//! - [`Row`] - One data line with bounds-checked numeric accessors
//! - [`TableReader`] - Header-skipping, quote-aware line reader
//!
//! # Example
//!
//! ```ignore
//! use csvmesh_core::table::TableReader;
//!
//! let rows = TableReader::new().read_file("mesh.csv")?;
//! let x = rows[0].number(2)?;
//! ```

mod error;
mod field;
mod reader;

pub use error::{FieldError, TableError};
pub use field::{Field, Row};
pub use reader::{Rows, TableReader};
