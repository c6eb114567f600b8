//! Four-phase reconciliation of a replica tree against its source
//!
//! The phases always run in this order:
//!
//! 1. create every source directory in the replica
//! 2. copy new and changed files, recording each source file as seen
//! 3. delete replica files that were not seen
//! 4. delete replica directories that do not exist in the source,
//!    deepest first
//!
//! Each phase checks the cancellation token before every entry.
//!
//! A replica entry of the wrong kind (a file where the source has a
//! directory, the reverse, or a symbolic link at either) is deleted in
//! phase 1 or 2 just before the source entry is written in its place.
//! Replica links are never followed: phase 3 removes stale ones like files.

use std::cmp::Reverse;
use std::fmt;
use std::path::Path;

use mirror_fs::{EntryKind, RelativePath, SeenSet, io, walk};
use tokio_util::sync::CancellationToken;

use super::detector::ChangeDetector;
use crate::config::{CopyFailurePolicy, SyncSettings};
use crate::error::TreeSide;
use crate::events::{ActionEvent, EventSink, Severity, Verb};
use crate::{Error, Result};

/// One of the four reconciliation phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CreateDirs,
    CopyFiles,
    DeleteFiles,
    DeleteDirs,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [
        Phase::CreateDirs,
        Phase::CopyFiles,
        Phase::DeleteFiles,
        Phase::DeleteDirs,
    ];
}

/// Whether a phase ran to the end or stopped at a cancellation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Completed,
    Cancelled,
}

/// Per-pass counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub dirs_created: usize,
    pub files_created: usize,
    pub files_updated: usize,
    pub files_skipped: usize,
    pub files_deleted: usize,
    pub dirs_deleted: usize,
    pub errors: usize,
}

impl PassStats {
    /// Number of mutations applied to the replica.
    pub fn changes(&self) -> usize {
        self.dirs_created
            + self.files_created
            + self.files_updated
            + self.files_deleted
            + self.dirs_deleted
    }
}

impl fmt::Display for PassStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dirs created, {} files created, {} updated, {} unchanged, {} files deleted, {} dirs deleted, {} errors",
            self.dirs_created,
            self.files_created,
            self.files_updated,
            self.files_skipped,
            self.files_deleted,
            self.dirs_deleted,
            self.errors
        )
    }
}

/// Applies the reconciliation phases for one pass.
///
/// Holds the per-pass state: the seen-set of source files and the set of
/// source directories found in phase 1. Both are dropped with the
/// reconciler at the end of the pass.
pub(crate) struct TreeReconciler<'a> {
    source: &'a Path,
    replica: &'a Path,
    detector: ChangeDetector,
    copy_failures: CopyFailurePolicy,
    sink: &'a dyn EventSink,
    cancel: &'a CancellationToken,
    source_dirs: SeenSet,
    seen_files: SeenSet,
    stats: PassStats,
}

impl<'a> TreeReconciler<'a> {
    pub(crate) fn new(
        settings: &'a SyncSettings,
        sink: &'a dyn EventSink,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            source: &settings.source,
            replica: &settings.replica,
            detector: ChangeDetector::new(settings.mtime_tolerance),
            copy_failures: settings.copy_failures,
            sink,
            cancel,
            source_dirs: SeenSet::new(settings.path_case),
            seen_files: SeenSet::new(settings.path_case),
            stats: PassStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> PassStats {
        self.stats
    }

    pub(crate) fn run(&mut self, phase: Phase) -> Result<Flow> {
        match phase {
            Phase::CreateDirs => self.create_dirs(),
            Phase::CopyFiles => self.copy_files(),
            Phase::DeleteFiles => self.delete_files(),
            Phase::DeleteDirs => self.delete_dirs(),
        }
    }

    fn create_dirs(&mut self) -> Result<Flow> {
        let dirs = enumerate(walk::list_dirs(self.source), TreeSide::Source)?;

        for dir in dirs {
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            self.source_dirs.insert(&dir);

            let target = dir.under(self.replica);
            if !self.clear_conflict(&dir, &target, EntryKind::Dir, "mkdir")? {
                continue;
            }
            match io::ensure_dir(&target) {
                Ok(true) => self.act(Verb::Mkdir, dir),
                Ok(false) => {}
                Err(e) => self.copy_failed(dir, "mkdir", e)?,
            }
        }

        Ok(Flow::Completed)
    }

    fn copy_files(&mut self) -> Result<Flow> {
        let files = enumerate(walk::list_files(self.source), TreeSide::Source)?;

        for file in files {
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            // Recorded before copying so a failed copy never turns into a delete
            self.seen_files.insert(&file);

            if !self.clear_conflict(&file, &file.under(self.replica), EntryKind::File, "copy")? {
                continue;
            }
            match self.mirror_file(&file) {
                Ok(verb) => self.act(verb, file),
                Err(e) => self.copy_failed(file, "copy", e)?,
            }
        }

        Ok(Flow::Completed)
    }

    fn mirror_file(&self, file: &RelativePath) -> mirror_fs::Result<Verb> {
        let src = file.under(self.source);
        let dst = file.under(self.replica);

        // Normally created in phase 1 already
        if let Some(parent) = dst.parent() {
            io::ensure_dir(parent)?;
        }

        if io::entry_kind(&dst)?.is_none() {
            io::copy_new(&src, &dst)?;
            Ok(Verb::Create)
        } else if self.detector.files_differ(&src, &dst)? {
            io::copy_replace(&src, &dst)?;
            Ok(Verb::Update)
        } else {
            Ok(Verb::Skip)
        }
    }

    fn delete_files(&mut self) -> Result<Flow> {
        // Links and special files too, so nothing unseen survives
        let entries = enumerate(walk::list_non_dirs(self.replica), TreeSide::Replica)?;

        for entry in entries {
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            if self.seen_files.contains(&entry) {
                continue;
            }

            let target = entry.under(self.replica);
            let removed = match io::entry_kind(&target) {
                Ok(Some(kind)) => self.remove(&entry, &target, kind),
                Ok(None) => continue,
                Err(e) => Err(e),
            };
            if let Err(e) = removed {
                self.report_failure(entry, "delete", &e);
            }
        }

        Ok(Flow::Completed)
    }

    fn delete_dirs(&mut self) -> Result<Flow> {
        let mut dirs = enumerate(walk::list_dirs(self.replica), TreeSide::Replica)?;
        // Longer paths first, so children go before the parents they empty
        dirs.sort_by_key(|dir| Reverse(dir.len()));

        for dir in dirs {
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            if self.source_dirs.contains(&dir) {
                continue;
            }

            let target = dir.under(self.replica);
            // Gone with a deleted ancestor
            if !matches!(io::entry_kind(&target), Ok(Some(EntryKind::Dir))) {
                continue;
            }

            if let Err(e) = self.remove(&dir, &target, EntryKind::Dir) {
                self.report_failure(dir, "delete", &e);
            }
        }

        Ok(Flow::Completed)
    }

    /// Remove a replica entry of the wrong kind so the source entry can
    /// take its place. Anything other than a real entry of `wanted` kind is
    /// in the way, links included.
    ///
    /// Returns `false` if the entry is still in the way.
    fn clear_conflict(
        &mut self,
        rel: &RelativePath,
        target: &Path,
        wanted: EntryKind,
        action: &str,
    ) -> Result<bool> {
        let cleared = match io::entry_kind(target) {
            Ok(None) => return Ok(true),
            Ok(Some(kind)) if kind == wanted => return Ok(true),
            Ok(Some(kind)) => self.remove(rel, target, kind),
            Err(e) => Err(e),
        };
        match cleared {
            Ok(()) => Ok(true),
            Err(e) => {
                self.copy_failed(rel.clone(), action, e)?;
                Ok(false)
            }
        }
    }

    /// Delete a replica entry without following links and report it.
    fn remove(
        &mut self,
        rel: &RelativePath,
        target: &Path,
        kind: EntryKind,
    ) -> mirror_fs::Result<()> {
        io::remove_entry(target, kind)?;
        if kind == EntryKind::Dir {
            self.stats.dirs_deleted += 1;
        } else {
            self.stats.files_deleted += 1;
        }
        self.act(Verb::Delete, rel.clone());
        Ok(())
    }

    fn act(&mut self, verb: Verb, path: RelativePath) {
        self.emit(ActionEvent::new(verb, path));
    }

    fn emit(&mut self, event: ActionEvent) {
        match event.verb {
            Verb::Mkdir => self.stats.dirs_created += 1,
            Verb::Create => self.stats.files_created += 1,
            Verb::Update => self.stats.files_updated += 1,
            Verb::Skip => self.stats.files_skipped += 1,
            // Counted in `remove`, which knows a file from a directory
            Verb::Delete => {}
            Verb::Error => self.stats.errors += 1,
        }
        self.sink.record(&event);
    }

    fn report_failure(&mut self, path: RelativePath, action: &str, error: &mirror_fs::Error) {
        let detail = format!("{action} {path} failed: {error:?}");
        self.emit(ActionEvent::error(path, format!("{action} failed: {error}")));
        self.sink.notice(Severity::Debug, &detail);
    }

    fn copy_failed(
        &mut self,
        path: RelativePath,
        action: &str,
        error: mirror_fs::Error,
    ) -> Result<()> {
        match self.copy_failures {
            CopyFailurePolicy::Report => {
                self.report_failure(path, action, &error);
                Ok(())
            }
            CopyFailurePolicy::Abort => Err(Error::Copy {
                path: path.to_string(),
                source: error,
            }),
        }
    }
}

fn enumerate(
    listing: mirror_fs::Result<Vec<RelativePath>>,
    side: TreeSide,
) -> Result<Vec<RelativePath>> {
    listing.map_err(|source| Error::Enumerate { side, source })
}
