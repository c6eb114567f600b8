//! Recursive tree enumeration
//!
//! Both listings are sorted by file name at every level, so a walk of an
//! unchanged tree always yields the same order. Symbolic links are never
//! followed. [`list_dirs`] and [`list_files`] leave them out;
//! [`list_non_dirs`] reports them so stale links can be removed.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::{Error, RelativePath, Result};

/// List every directory below `root`, excluding `root` itself.
///
/// # Errors
///
/// Returns [`Error::Walk`] if `root` or any directory below it cannot be read.
pub fn list_dirs(root: &Path) -> Result<Vec<RelativePath>> {
    collect(root, |entry| entry.file_type().is_dir())
}

/// List every regular file below `root`.
///
/// # Errors
///
/// Returns [`Error::Walk`] if `root` or any directory below it cannot be read.
pub fn list_files(root: &Path) -> Result<Vec<RelativePath>> {
    collect(root, |entry| entry.file_type().is_file())
}

/// List every entry below `root` that is not a directory: regular files,
/// symbolic links (including links to directories) and special files.
///
/// # Errors
///
/// Returns [`Error::Walk`] if `root` or any directory below it cannot be read.
pub fn list_non_dirs(root: &Path) -> Result<Vec<RelativePath>> {
    collect(root, |entry| !entry.file_type().is_dir())
}

fn collect(root: &Path, keep: impl Fn(&DirEntry) -> bool) -> Result<Vec<RelativePath>> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| Error::Walk {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if !keep(&entry) {
            if entry.file_type().is_symlink() {
                tracing::trace!(path = %entry.path().display(), "Skipping symbolic link");
            }
            continue;
        }
        if let Some(rel) = RelativePath::from_root(root, entry.path()) {
            entries.push(rel);
        }
    }

    Ok(entries)
}
