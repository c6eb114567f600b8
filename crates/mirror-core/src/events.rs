//! Action events and the sink they are reported to
//!
//! The reconciler never formats log lines itself. It hands an
//! [`ActionEvent`] (or a free-form notice with a [`Severity`]) to an
//! [`EventSink`], and the sink decides how to render and where to write.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use mirror_fs::RelativePath;

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Verbose per-file notices such as unchanged files
    Debug,
    /// Cycle start/finish and general notices
    Info,
    /// One line per mutation applied to the replica
    Action,
    /// One line per failure
    Error,
}

impl Severity {
    /// Tag written in front of every log line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Action => "SYNC",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened to a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Mkdir,
    Create,
    Update,
    Skip,
    Delete,
    Error,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mkdir => "MKDIR",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Skip => "SKIP",
            Self::Delete => "DELETE",
            Self::Error => "ERROR",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Mkdir | Self::Create | Self::Update | Self::Delete => Severity::Action,
            Self::Skip => Severity::Debug,
            Self::Error => Severity::Error,
        }
    }

    /// Whether this verb describes a change made to the replica.
    pub fn is_mutation(self) -> bool {
        self.severity() == Severity::Action
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reconciliation event.
///
/// Renders as `VERB path`, with `: detail` appended when a detail is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub verb: Verb,
    pub path: RelativePath,
    pub detail: Option<String>,
}

impl ActionEvent {
    pub fn new(verb: Verb, path: RelativePath) -> Self {
        Self {
            verb,
            path,
            detail: None,
        }
    }

    /// An `ERROR` event carrying the failure reason.
    pub fn error(path: RelativePath, detail: impl Into<String>) -> Self {
        Self {
            verb: Verb::Error,
            path,
            detail: Some(detail.into()),
        }
    }

    pub fn severity(&self) -> Severity {
        self.verb.severity()
    }
}

impl fmt::Display for ActionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Consumer of everything a pass reports.
///
/// Implementations must be usable from the blocking worker that runs the
/// pass, hence `Send + Sync`.
pub trait EventSink: Send + Sync {
    /// Report one action event.
    fn record(&self, event: &ActionEvent);

    /// Report a free-form message at the given severity.
    fn notice(&self, severity: Severity, message: &str);
}

/// One entry captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEntry {
    Event(ActionEvent),
    Notice(Severity, String),
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<SinkEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    pub fn entries(&self) -> Vec<SinkEntry> {
        self.lock().clone()
    }

    /// All action events recorded so far, in order.
    pub fn events(&self) -> Vec<ActionEvent> {
        self.lock()
            .iter()
            .filter_map(|entry| match entry {
                SinkEntry::Event(event) => Some(event.clone()),
                SinkEntry::Notice(..) => None,
            })
            .collect()
    }

    /// Rendered events that changed the replica or reported a failure.
    ///
    /// `SKIP` events are left out.
    pub fn actions(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter(|event| event.verb != Verb::Skip)
            .map(ToString::to_string)
            .collect()
    }

    /// Notice messages recorded at the given severity.
    pub fn notices(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|entry| match entry {
                SinkEntry::Notice(s, message) if *s == severity => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &ActionEvent) {
        self.lock().push(SinkEntry::Event(event.clone()));
    }

    fn notice(&self, severity: Severity, message: &str) {
        self.lock()
            .push(SinkEntry::Notice(severity, message.to_owned()));
    }
}

/// Sink that forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ActionEvent) {
        match event.severity() {
            Severity::Debug => tracing::debug!(verb = %event.verb, path = %event.path, "{event}"),
            Severity::Info | Severity::Action => {
                tracing::info!(verb = %event.verb, path = %event.path, "{event}")
            }
            Severity::Error => tracing::error!(verb = %event.verb, path = %event.path, "{event}"),
        }
    }

    fn notice(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!("{message}"),
            Severity::Info | Severity::Action => tracing::info!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}
