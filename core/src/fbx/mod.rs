//! FBX exporter.
//!
//! Builds an FBX 7.4 document holding a single mesh and writes it either as
//! text ([`FbxFormat::Ascii`]) or in the native binary encoding
//! ([`FbxFormat::Binary`]).
//!
//! # Example
//!
//! ```ignore
//! use csvmesh_core::fbx::{FbxFormat, build_document, save};
//!
//! let doc = build_document(&mesh);
//! let written = save("out.fbx", &doc, FbxFormat::Binary)?;
//! ```

mod ascii;
mod binary;
mod document;
mod error;
pub mod types;

pub use ascii::to_ascii;
pub use binary::{MAGIC, to_binary};
pub use error::ExportError;
pub use types::*;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::mesh::MeshBuffer;

/// Serialization variant of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FbxFormat {
    /// Human-readable text.
    #[default]
    Ascii,
    /// Native binary encoding.
    Binary,
}

impl FbxFormat {
    /// Select the format from an "export as ASCII" flag.
    pub fn from_ascii_flag(ascii: bool) -> Self {
        if ascii { Self::Ascii } else { Self::Binary }
    }
}

/// Creator string written into every exported document.
pub fn creator() -> String {
    format!("csvmesh {}", crate::VERSION)
}

/// Build the document for a single mesh.
pub fn build_document(mesh: &MeshBuffer) -> FbxDocument {
    let mut ctx = document::ExportContext::new(creator());
    ctx.add_mesh(mesh);
    ctx.finish()
}

/// Serialize a document in memory.
pub fn serialize(doc: &FbxDocument, format: FbxFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        FbxFormat::Ascii => Ok(to_ascii(doc, &creator()).into_bytes()),
        FbxFormat::Binary => to_binary(doc),
    }
}

/// Serialize a document and write it to `path`.
///
/// Nothing is written until serialization has succeeded, and `path` only
/// appears (or is replaced) once every byte is on disk. Returns the number of
/// bytes written.
pub fn save(path: impl AsRef<Path>, doc: &FbxDocument, format: FbxFormat) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let bytes = serialize(doc, format)?;

    write_output(path, |file| file.write_all(&bytes))?;

    log::debug!("wrote {} bytes ({format:?}) to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

/// Write `path` through a temporary file in the same directory.
///
/// The temporary file is removed if `write` fails, and an existing file at
/// `path` is left untouched.
fn write_output(
    path: &Path,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source: io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write(temp.as_file_mut())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(write_error)?;
    output_permissions(path, temp.as_file())
        .and_then(|permissions| temp.as_file().set_permissions(permissions))
        .map_err(write_error)?;
    temp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

/// Permissions of the file being replaced, or `rw-r--r--` for a new one.
fn output_permissions(path: &Path, temp: &File) -> io::Result<fs::Permissions> {
    if let Ok(existing) = fs::metadata(path) {
        return Ok(existing.permissions());
    }
    #[allow(unused_mut)]
    let mut permissions = temp.metadata()?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(0o644);
    }
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(FbxFormat::from_ascii_flag(true), FbxFormat::Ascii);
        assert_eq!(FbxFormat::from_ascii_flag(false), FbxFormat::Binary);
    }

    #[test]
    fn test_serialize_selects_writer() {
        let doc = build_document(&MeshBuffer::new("empty"));

        let text = serialize(&doc, FbxFormat::Ascii).unwrap();
        assert!(text.starts_with(b"; FBX 7.4.0 project file"));

        let bin = serialize(&doc, FbxFormat::Binary).unwrap();
        assert!(bin.starts_with(MAGIC));
    }

    fn dir_entries(dir: &Path) -> Vec<std::path::PathBuf> {
        fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect()
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.fbx");
        let written = save(&path, &build_document(&MeshBuffer::new("m")), FbxFormat::Binary).unwrap();

        assert_eq!(fs::read(&path).unwrap().len(), written);
        assert_eq!(dir_entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fbx");

        let err = write_output(&path, |file| {
            file.write_all(b"Kaydara FBX Binary")?;
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"))
        })
        .unwrap_err();

        assert!(matches!(err, ExportError::Write { .. }));
        assert!(err.to_string().contains("no space left"));
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fbx");
        fs::write(&path, b"previous").unwrap();

        let result = write_output(&path, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::other("write failed"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"previous");
        assert_eq!(dir_entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fbx");
        fs::write(&path, b"previous").unwrap();

        save(&path, &build_document(&MeshBuffer::new("m")), FbxFormat::Ascii).unwrap();

        assert!(fs::read(&path).unwrap().starts_with(b"; FBX 7.4.0 project file"));
    }

    #[test]
    fn test_save_to_missing_directory_reports_io_error() {
        let doc = build_document(&MeshBuffer::new("m"));
        let err = save("/nonexistent/csvmesh/out.fbx", &doc, FbxFormat::Binary).unwrap_err();

        match &err {
            ExportError::Open { source, .. } => {
                assert!(err.to_string().contains(&source.to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
