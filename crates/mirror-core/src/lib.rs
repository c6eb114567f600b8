//! Reconciliation core for folder-mirror
//!
//! This crate keeps a replica folder identical to a source folder,
//! implementing:
//!
//! - **Change detection**: size, then modification time, then content checksum
//! - **Tree reconciliation**: create directories, copy files, delete stale
//!   files, delete stale directories, in that order
//! - **Sync cycle**: one cancellable pass with start/finish notices
//! - **Scheduler**: the periodic loop that runs passes until cancelled
//!
//! # Architecture
//!
//! `mirror-core` sits above the filesystem layer and below the CLI:
//!
//! ```text
//!                  mirror-cli
//!                      |
//!                 mirror-core
//!        (Scheduler -> SyncCycle -> TreeReconciler -> ChangeDetector)
//!                      |
//!                  mirror-fs
//! ```
//!
//! Everything a pass does is reported to an [`EventSink`]; the crate itself
//! never writes log lines.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mirror_core::{MemorySink, SyncCycle, SyncSettings};
//! use tokio_util::sync::CancellationToken;
//!
//! let settings = SyncSettings::new("/data/source", "/data/replica");
//! let cycle = SyncCycle::new(settings, Arc::new(MemorySink::new()));
//! let report = cycle.run_once(&CancellationToken::new())?;
//! println!("{}", report.stats);
//! # Ok::<(), mirror_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod sync;

pub use config::{
    CopyFailurePolicy, DEFAULT_INTERVAL, DEFAULT_MTIME_TOLERANCE, FileConfig, PathCaseChoice,
    SyncSettings,
};
pub use error::{Error, Result, TreeSide};
pub use events::{ActionEvent, EventSink, MemorySink, Severity, SinkEntry, TracingSink, Verb};
pub use sync::{
    ChangeDetector, FileSnapshot, PassOutcome, PassReport, PassState, PassStats, Phase, Scheduler,
    SchedulerSummary, SyncCycle,
};
