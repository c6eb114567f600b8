//! Validated settings for the sync loop

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mirror_fs::PathCase;
use serde::Deserialize;

use crate::{Error, Result};

/// Interval used when none is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Modification times closer than this are treated as equal
pub const DEFAULT_MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// What to do when copying a file or creating a directory fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFailurePolicy {
    /// Emit an `ERROR` event and continue with the next entry
    #[default]
    Report,
    /// End the pass with [`Error::Copy`]
    Abort,
}

impl FromStr for CopyFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown copy failure policy '{other}' (expected report or abort)"
            )),
        }
    }
}

/// Settings for one source/replica pair
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Tree treated as ground truth
    pub source: PathBuf,
    /// Tree kept in correspondence with the source
    pub replica: PathBuf,
    /// Delay between the end of one pass and the start of the next
    pub interval: Duration,
    /// Modification-time tolerance used by the change detector
    pub mtime_tolerance: Duration,
    /// How relative paths are compared between the trees
    pub path_case: PathCase,
    /// Whether copy failures end the pass
    pub copy_failures: CopyFailurePolicy,
}

impl SyncSettings {
    /// Create settings with defaults for everything but the two roots.
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval: DEFAULT_INTERVAL,
            mtime_tolerance: DEFAULT_MTIME_TOLERANCE,
            path_case: PathCase::platform_default(),
            copy_failures: CopyFailurePolicy::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_mtime_tolerance(mut self, tolerance: Duration) -> Self {
        self.mtime_tolerance = tolerance;
        self
    }

    pub fn with_path_case(mut self, path_case: PathCase) -> Self {
        self.path_case = path_case;
        self
    }

    pub fn with_copy_failures(mut self, policy: CopyFailurePolicy) -> Self {
        self.copy_failures = policy;
        self
    }

    /// Reject settings the loop cannot run with.
    ///
    /// The interval must be positive, and neither root may contain the
    /// other: a replica inside the source would be mirrored into itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::invalid_settings("interval must be positive"));
        }
        if self.source == self.replica {
            return Err(Error::invalid_settings(format!(
                "source and replica are the same folder: {}",
                self.source.display()
            )));
        }
        if self.replica.starts_with(&self.source) {
            return Err(Error::invalid_settings(format!(
                "replica {} is inside source {}",
                self.replica.display(),
                self.source.display()
            )));
        }
        if self.source.starts_with(&self.replica) {
            return Err(Error::invalid_settings(format!(
                "source {} is inside replica {}",
                self.source.display(),
                self.replica.display()
            )));
        }
        Ok(())
    }
}
