//! Error types for FBX export.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while serializing or saving an FBX document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output file could not be created.
    #[error("failed to open {} for writing: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the serialized document failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A node name is longer than the 255 bytes a binary record can hold.
    #[error("node name {name:?} is too long for a binary record")]
    NodeName { name: String },
    /// An array or string is longer than a `u32` length field.
    #[error("array of {len} elements is too long for a binary record")]
    ArrayTooLong { len: usize },
    /// The document outgrew the 32-bit record offsets of this version.
    #[error("document exceeds the 4 GiB offset limit of FBX {version}")]
    TooLarge { version: u32 },
}
