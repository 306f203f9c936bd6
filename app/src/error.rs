use csvmesh_core::ConvertError;
use csvmesh_core::preset::PresetError;
use thiserror::Error;

/// Errors reported by the command line front-end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("failed to start conversion worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}
