//! Copy and removal primitives for the replica tree
//!
//! Copies carry the source modification time over to the replica so that
//! the next pass can settle unchanged files from metadata alone.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::{Error, Result};

/// Ensure a directory exists, creating missing ancestors.
///
/// Returns `true` if anything had to be created.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Copy `src` to a `dst` that must not exist yet.
///
/// Fails with `AlreadyExists` instead of overwriting. A partially written
/// destination is removed again if the copy fails midway.
pub fn copy_new(src: &Path, dst: &Path) -> Result<u64> {
    let mut reader = File::open(src).map_err(|e| Error::io(src, e))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(|e| Error::io(dst, e))?;

    let copied = match io::copy(&mut reader, &mut writer) {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(dst);
            return Err(Error::io(dst, e));
        }
    };
    drop(writer);

    preserve_mtime(src, dst)?;
    Ok(copied)
}

/// Copy `src` over an existing `dst`.
///
/// Uses write-to-temp-then-rename, so `dst` holds either the old or the new
/// content at any moment, never a partial copy.
pub fn copy_replace(src: &Path, dst: &Path) -> Result<u64> {
    let temp_path = temp_sibling(dst);

    let mut reader = File::open(src).map_err(|e| Error::io(src, e))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let result = io::copy(&mut reader, &mut writer).and_then(|n| {
        writer.sync_all()?;
        Ok(n)
    });
    let copied = match result {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(&temp_path, e));
        }
    };
    drop(writer);

    if let Err(e) = preserve_mtime(src, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, dst) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(dst, e));
    }

    Ok(copied)
}

/// What occupies a path, judged without following a symbolic link there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symbolic link (dangling or not) or special file
    Other,
}

/// Inspect the entry at `path` without following links.
///
/// Returns `None` if nothing is there. A dangling link is `Some(Other)`.
pub fn entry_kind(path: &Path) -> Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            let file_type = metadata.file_type();
            Ok(Some(if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            }))
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(None)
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Remove a single file.
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}

/// Remove a directory and everything below it.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Remove the entry at `path` as the given kind.
///
/// A link is removed itself; its target is never touched.
pub fn remove_entry(path: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::Dir => remove_dir_all(path),
        EntryKind::File => remove_file(path),
        EntryKind::Other => remove_link(path),
    }
}

fn remove_link(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Directory links on Windows go through remove_dir
        #[cfg(windows)]
        Err(_) if fs::remove_dir(path).is_ok() => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn preserve_mtime(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dst, mtime).map_err(|e| Error::io(dst, e))
}

// Same directory as the target so the rename never crosses filesystems.
fn temp_sibling(dst: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.mirror-tmp",
        dst.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    dst.with_file_name(temp_name)
}
