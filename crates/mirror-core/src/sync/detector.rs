//! Change detection between a source file and its replica counterpart

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use mirror_fs::checksum::compute_file_checksum;
use mirror_fs::{Error, Result};

use crate::config::DEFAULT_MTIME_TOLERANCE;

/// Metadata read from a file at the moment of comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Size in bytes
    pub len: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileSnapshot {
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        let modified = metadata.modified().map_err(|e| Error::io(path, e))?;
        Ok(Self {
            len: metadata.len(),
            modified,
        })
    }
}

/// Decides whether a replica file needs to be rewritten.
///
/// Checks run cheapest first and stop at the first conclusive one:
///
/// 1. Different sizes: the files differ.
/// 2. Modification times within the tolerance: the files are treated as
///    equal, without reading content.
/// 3. Otherwise the content checksums decide.
///
/// Step 2 is a heuristic: two same-size files touched within the tolerance
/// of each other are never read, even if their content differs.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    tolerance: Duration,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MTIME_TOLERANCE)
    }
}

impl ChangeDetector {
    pub fn new(tolerance: Duration) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Returns `true` if `replica` has to be overwritten with `source`.
    ///
    /// Both paths must name existing regular files.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata or content of either file cannot be read.
    pub fn files_differ(&self, source: &Path, replica: &Path) -> Result<bool> {
        let src = FileSnapshot::read(source)?;
        let dst = FileSnapshot::read(replica)?;

        if src.len != dst.len {
            return Ok(true);
        }

        if mtime_gap(src.modified, dst.modified) < self.tolerance {
            return Ok(false);
        }

        let src_sum = compute_file_checksum(source).map_err(|e| Error::io(source, e))?;
        let dst_sum = compute_file_checksum(replica).map_err(|e| Error::io(replica, e))?;
        Ok(src_sum != dst_sum)
    }
}

/// Absolute difference between two timestamps.
fn mtime_gap(a: SystemTime, b: SystemTime) -> Duration {
    a.duration_since(b).unwrap_or_else(|e| e.duration())
}
