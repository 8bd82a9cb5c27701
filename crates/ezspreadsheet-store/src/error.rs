use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    #[error("unsupported {feature} ({context})")]
    Unsupported { feature: String, context: String },

    #[error("no tabular format for extension of {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The target is held open elsewhere. Recoverable: retrying `save` is allowed.
    #[error("{} is locked by another process", path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cell address out of range: {0}")]
    Coord(#[from] ezspreadsheet_common::CoordError),
}

impl StoreError {
    pub fn from_backend(backend: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, StoreError::Locked { .. })
    }

    /// Route a failed write of `path` to `Locked` when the OS refused access.
    pub(crate) fn from_save(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            StoreError::Locked {
                path: path.to_path_buf(),
                source: err,
            }
        } else {
            StoreError::Io(err)
        }
    }
}
