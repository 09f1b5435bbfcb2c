//! Error types for Sceneport

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using Sceneport's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting or cleaning a scene
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation failed on a specific path
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mesh exporter failed for one object
    #[error("Mesh export failed for '{object}': {reason}")]
    MeshExport { object: String, reason: String },

    /// The snapshot is structurally unusable
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Another export or clean holds the lock
    #[error("Another export is already running (lock file {})", .0.display())]
    ExportInProgress(PathBuf),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
