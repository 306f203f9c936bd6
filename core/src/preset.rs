//! Column layout presets loaded from TOML.
//!
//! ```toml
//! [columns]
//! vertex_id = 0
//! position = 2
//! normal = 5
//! uv0 = 8
//! color = 10
//!
//! [output]
//! ascii = false
//! strict_triangles = true
//! ```
//!
//! An optional column missing from `[columns]` disables that attribute.
//! `position` defaults to 2.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::convert::{ColumnOffsets, TrailingRowPolicy};
use crate::fbx::FbxFormat;

/// Errors that can occur while loading a preset.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse preset {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level preset document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnPreset {
    #[serde(default)]
    pub columns: PresetColumns,
    #[serde(default)]
    pub output: PresetOutput,
}

/// `[columns]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetColumns {
    pub vertex_id: Option<usize>,
    #[serde(default = "default_position")]
    pub position: usize,
    pub normal: Option<usize>,
    pub uv0: Option<usize>,
    pub uv1: Option<usize>,
    pub tangent: Option<usize>,
    pub color: Option<usize>,
}

impl Default for PresetColumns {
    fn default() -> Self {
        Self {
            vertex_id: None,
            position: default_position(),
            normal: None,
            uv0: None,
            uv1: None,
            tangent: None,
            color: None,
        }
    }
}

fn default_position() -> usize {
    2
}

/// `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetOutput {
    #[serde(default = "default_ascii")]
    pub ascii: bool,
    #[serde(default)]
    pub strict_triangles: bool,
}

impl Default for PresetOutput {
    fn default() -> Self {
        Self {
            ascii: default_ascii(),
            strict_triangles: false,
        }
    }
}

fn default_ascii() -> bool {
    true
}

impl ColumnPreset {
    /// Parse a preset from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn columns(&self) -> ColumnOffsets {
        let c = &self.columns;
        ColumnOffsets {
            vertex_id: c.vertex_id,
            position: c.position,
            normal: c.normal,
            uv0: c.uv0,
            uv1: c.uv1,
            tangent: c.tangent,
            color: c.color,
        }
    }

    pub fn format(&self) -> FbxFormat {
        FbxFormat::from_ascii_flag(self.output.ascii)
    }

    pub fn trailing_rows(&self) -> TrailingRowPolicy {
        if self.output.strict_triangles {
            TrailingRowPolicy::Reject
        } else {
            TrailingRowPolicy::Warn
        }
    }
}

/// Load a preset from a TOML file.
pub fn load_preset(path: impl AsRef<Path>) -> Result<ColumnPreset, PresetError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let preset = ColumnPreset::from_toml_str(&content).map_err(|source| PresetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded preset {}", path.display());
    Ok(preset)
}
