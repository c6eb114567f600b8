//! Periodic pass loop

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::cycle::{PassOutcome, SyncCycle};
use crate::events::Severity;

pub const EXITING: &str = "Exiting.";

/// Totals for one run of the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    /// Passes started, including failed and cancelled ones
    pub passes: u64,
    /// Passes that ended with an error
    pub failed_passes: u64,
    /// Whether the loop stopped because the token was cancelled
    pub cancelled: bool,
}

/// Runs a [`SyncCycle`] over and over until cancelled.
///
/// Passes never overlap. The interval is measured from the end of one pass
/// to the start of the next. A failed pass is logged and the loop carries on.
pub struct Scheduler {
    cycle: Arc<SyncCycle>,
    interval: Duration,
    max_passes: Option<u64>,
}

impl Scheduler {
    pub fn new(cycle: Arc<SyncCycle>) -> Self {
        let interval = cycle.settings().interval;
        Self {
            cycle,
            interval,
            max_passes: None,
        }
    }

    /// Stop after this many passes instead of running until cancelled.
    pub fn with_max_passes(mut self, max_passes: u64) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the loop until the token is cancelled or `max_passes` is reached.
    ///
    /// Each pass runs on the blocking thread pool so the runtime stays free
    /// to observe the token. The wait between passes ends early on
    /// cancellation.
    pub async fn run(&self, cancel: CancellationToken) -> SchedulerSummary {
        let sink = Arc::clone(self.cycle.sink());
        let mut summary = SchedulerSummary::default();

        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let cycle = Arc::clone(&self.cycle);
            let token = cancel.clone();
            let result = tokio::task::spawn_blocking(move || cycle.run_once(&token)).await;
            summary.passes += 1;

            match result {
                Ok(Ok(report)) if report.outcome == PassOutcome::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    summary.failed_passes += 1;
                    sink.notice(Severity::Error, &format!("Unexpected error: {e}"));
                    sink.notice(Severity::Debug, &format!("{e:?}"));
                }
                Err(e) => {
                    summary.failed_passes += 1;
                    sink.notice(Severity::Error, &format!("Synchronization worker failed: {e}"));
                    sink.notice(Severity::Debug, &format!("{e:?}"));
                }
            }

            if let Some(max) = self.max_passes
                && summary.passes >= max
            {
                break;
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        sink.notice(Severity::Info, EXITING);
        tracing::debug!(?summary, "Scheduler stopped");
        summary
    }
}
