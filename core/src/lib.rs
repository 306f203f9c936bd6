//! # csvmesh core
//!
//! Converts a row-oriented CSV vertex table into an FBX mesh.
//!
//! - [`table`] - Parses delimited text into typed [`Row`](table::Row)s
//! - [`mesh`] - Maps column ranges onto per-vertex attribute buffers
//! - [`fbx`] - FBX document model with ASCII and binary writers
//! - [`convert`] - The single-call conversion pipeline
//! - [`task`] - Background conversion with a one-shot completion signal
//! - [`preset`] - TOML column-layout presets

pub mod convert;
pub mod fbx;
pub mod mesh;
pub mod preset;
pub mod table;
pub mod task;

pub use convert::{
    ColumnOffsets, ConversionReport, ConvertError, ConvertOptions, TrailingRowPolicy, convert,
    convert_logged, convert_with_cancel,
};
pub use task::{CancellationToken, ConversionTask};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
