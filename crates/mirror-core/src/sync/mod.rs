//! Reconciliation of a replica tree against its source
//!
//! This module provides:
//! - **detector**: decide whether a replica file must be rewritten
//! - **reconcile**: the four reconciliation phases
//! - **cycle**: one full pass, with cancellation and start/finish notices
//! - **scheduler**: the periodic loop around passes

mod cycle;
mod detector;
mod reconcile;
mod scheduler;

pub use cycle::{
    CYCLE_CANCELLED, CYCLE_FINISHED, CYCLE_STARTED, PassOutcome, PassReport, PassState, SyncCycle,
};
pub use detector::{ChangeDetector, FileSnapshot};
pub use reconcile::{PassStats, Phase};
pub use scheduler::{EXITING, Scheduler, SchedulerSummary};
