//! Error types for mirror-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mirror-core
    #[error(transparent)]
    Core(#[from] mirror_core::Error),

    /// Error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },

    /// Source root missing at startup
    #[error("Source folder does not exist: {}", path.display())]
    SourceMissing { path: PathBuf },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Usage problems exit with 2 (as clap does), a missing source with 3,
    /// everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::User { .. } | Self::Core(mirror_core::Error::InvalidSettings { .. }) => 2,
            Self::SourceMissing { .. } => 3,
            _ => 1,
        }
    }
}
