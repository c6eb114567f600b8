//! One full synchronization pass

use std::sync::Arc;
use std::time::{Duration, Instant};

use mirror_fs::io;
use tokio_util::sync::CancellationToken;

use super::reconcile::{Flow, PassStats, Phase, TreeReconciler};
use crate::config::SyncSettings;
use crate::events::{EventSink, Severity};
use crate::{Error, Result};

pub const CYCLE_STARTED: &str = "--- Synchronization cycle started ---";
pub const CYCLE_FINISHED: &str = "--- Synchronization cycle finished ---";
pub const CYCLE_CANCELLED: &str = "--- Synchronization cycle cancelled ---";

/// Where a pass is, or where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    NotStarted,
    EnumeratingDirs,
    CopyingFiles,
    DeletingFiles,
    DeletingDirs,
    Done,
    Cancelled,
    Failed,
}

impl From<Phase> for PassState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::CreateDirs => Self::EnumeratingDirs,
            Phase::CopyFiles => Self::CopyingFiles,
            Phase::DeleteFiles => Self::DeletingFiles,
            Phase::DeleteDirs => Self::DeletingDirs,
        }
    }
}

/// How a pass that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed,
    Cancelled,
}

/// Report from a pass that did not fail
#[derive(Debug, Clone)]
pub struct PassReport {
    pub outcome: PassOutcome,
    /// Final state: `Done` or `Cancelled`
    pub state: PassState,
    pub stats: PassStats,
    pub elapsed: Duration,
}

impl PassReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == PassOutcome::Completed
    }
}

/// Runs reconciliation passes for one source/replica pair.
pub struct SyncCycle {
    settings: SyncSettings,
    sink: Arc<dyn EventSink>,
}

impl SyncCycle {
    pub fn new(settings: SyncSettings, sink: Arc<dyn EventSink>) -> Self {
        Self { settings, sink }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Run one pass: all four phases, in order.
    ///
    /// Blocks the calling thread for the duration of the pass. The token is
    /// checked before every directory and file; once it is cancelled the pass
    /// stops where it is and nothing already applied is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceMissing`] if the source root is not a
    /// directory, [`Error::Enumerate`] if either tree cannot be walked, and
    /// [`Error::Copy`] for copy failures under the abort policy. Per-entry
    /// failures that are reported and skipped do not end the pass.
    pub fn run_once(&self, cancel: &CancellationToken) -> Result<PassReport> {
        let started = Instant::now();
        let mut state = PassState::NotStarted;

        if cancel.is_cancelled() {
            return Ok(self.report(PassState::Cancelled, PassStats::default(), started));
        }

        self.sink.notice(Severity::Info, CYCLE_STARTED);

        if !self.settings.source.is_dir() {
            transition(&mut state, PassState::Failed);
            return Err(Error::SourceMissing {
                path: self.settings.source.clone(),
            });
        }
        if let Err(e) = io::ensure_dir(&self.settings.replica) {
            transition(&mut state, PassState::Failed);
            return Err(e.into());
        }

        let mut reconciler = TreeReconciler::new(&self.settings, self.sink.as_ref(), cancel);

        for phase in Phase::ALL {
            transition(&mut state, phase.into());
            match reconciler.run(phase) {
                Ok(Flow::Completed) => {}
                Ok(Flow::Cancelled) => {
                    transition(&mut state, PassState::Cancelled);
                    self.sink.notice(Severity::Info, CYCLE_CANCELLED);
                    return Ok(self.report(state, reconciler.stats(), started));
                }
                Err(e) => {
                    transition(&mut state, PassState::Failed);
                    return Err(e);
                }
            }
        }

        transition(&mut state, PassState::Done);
        let stats = reconciler.stats();
        self.sink.notice(Severity::Info, CYCLE_FINISHED);
        self.sink.notice(Severity::Info, &format!("Summary: {stats}"));

        Ok(self.report(state, stats, started))
    }

    fn report(&self, state: PassState, stats: PassStats, started: Instant) -> PassReport {
        let outcome = if state == PassState::Done {
            PassOutcome::Completed
        } else {
            PassOutcome::Cancelled
        };
        let elapsed = started.elapsed();
        tracing::debug!(?state, ?elapsed, changes = stats.changes(), "Pass ended");
        PassReport {
            outcome,
            state,
            stats,
            elapsed,
        }
    }
}

fn transition(state: &mut PassState, next: PassState) {
    tracing::debug!(from = ?*state, to = ?next, "Pass state change");
    *state = next;
}
