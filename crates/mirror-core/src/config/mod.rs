//! Synchronization settings and the optional config file
//!
//! Settings come from two places, merged by the caller (command line wins):
//!
//! 1. **Config file** - TOML, JSON or YAML, deserialized into [`FileConfig`]
//! 2. **Command line** - flags and environment variables
//!
//! The merged result is a [`SyncSettings`], validated once before the first
//! pass.
//!
//! # Example
//!
//! ```toml
//! source = "/data/source"
//! replica = "/data/replica"
//! interval_secs = 30
//! log = "/var/log/mirror.log"
//! path_case = "auto"
//! copy_failures = "report"
//! ```

mod file;
mod settings;

pub use file::{FileConfig, PathCaseChoice};
pub use settings::{
    CopyFailurePolicy, DEFAULT_INTERVAL, DEFAULT_MTIME_TOLERANCE, SyncSettings,
};
