//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two trees an operation was looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSide {
    Source,
    Replica,
}

impl std::fmt::Display for TreeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Replica => write!(f, "replica"),
        }
    }
}

/// Errors that end a synchronization pass
///
/// Per-item failures that are reported and skipped never show up here;
/// they are emitted as `ERROR` events instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source root is missing or not a directory
    #[error("Source folder does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// A tree could not be walked
    #[error("Failed to enumerate {side} tree: {source}")]
    Enumerate {
        side: TreeSide,
        #[source]
        source: mirror_fs::Error,
    },

    /// Copying a file or creating a directory failed under the abort policy
    #[error("Failed to mirror {path}: {source}")]
    Copy {
        path: String,
        #[source]
        source: mirror_fs::Error,
    },

    /// Settings rejected before the first pass
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),
}

impl Error {
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }
}
