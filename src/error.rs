// error.rs - Typed failures for loading, converting and exporting meshes
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PLY file {path:?}: {message}")]
    Ply { path: PathBuf, message: String },

    #[error("failed to load glTF file {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("unsupported mesh format for {path:?} (expected .ply, .glb or .gltf)")]
    UnsupportedFormat { path: PathBuf },

    #[error("unsupported geometry in {path:?}: {reason}")]
    UnsupportedGeometry { path: PathBuf, reason: String },

    #[error("failed to encode GLB: {0}")]
    Encode(String),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn unsupported_geometry(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConvertError::UnsupportedGeometry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
