//! Flat listings of a directory tree.
//!
//! Two trees are mirrors of each other when their listings are equal.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// One entry of a tree listing, keyed by its `/`-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Entry {
    Dir(String),
    File(String, Vec<u8>),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Self::Dir(path) | Self::File(path, _) => path,
        }
    }
}

/// List every directory and file under `root` (the root itself excluded),
/// sorted by relative path. File entries carry their full content.
///
/// # Panics
/// Panics if the tree cannot be walked or a file cannot be read.
pub fn tree_listing(root: &Path) -> Vec<Entry> {
    let mut entries: Vec<Entry> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap_or_else(|e| panic!("tree_listing: walk failed: {e}"));
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|e| panic!("tree_listing: {e}"))
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if entry.file_type().is_dir() {
                Entry::Dir(rel)
            } else {
                let content = fs::read(entry.path()).unwrap_or_else(|e| {
                    panic!("tree_listing: failed to read {}: {e}", entry.path().display())
                });
                Entry::File(rel, content)
            }
        })
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));
    entries
}
