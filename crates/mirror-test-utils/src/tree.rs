//! [`TestTree`] fixture for mirroring scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;

use crate::snapshot::{Entry, tree_listing};

/// A temporary directory holding a `source` folder and a `replica` path,
/// with helpers for setting up and checking both.
///
/// The replica folder is not created; the first pass is expected to create
/// it. Call [`TestTree::create_replica`] to start from an existing one.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write_source("a.txt", "A");
/// tree.write_source("sub/b.txt", "B");
/// // ... run a pass ...
/// tree.assert_mirrored();
/// ```
pub struct TestTree {
    temp_dir: TempDir,
    source: PathBuf,
    replica: PathBuf,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create a temporary directory with an empty `source` folder.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir(&source).unwrap();
        Self {
            temp_dir,
            source,
            replica,
        }
    }

    /// Directory that holds both trees.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn create_replica(&self) {
        fs::create_dir_all(&self.replica).unwrap();
    }

    /// Write a source file, creating parent directories as needed.
    pub fn write_source(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write_file(&self.source, rel, content.as_ref())
    }

    /// Write a replica file, creating parent directories as needed.
    pub fn write_replica(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write_file(&self.replica, rel, content.as_ref())
    }

    pub fn mkdir_source(&self, rel: &str) -> PathBuf {
        make_dir(&self.source, rel)
    }

    pub fn mkdir_replica(&self, rel: &str) -> PathBuf {
        make_dir(&self.replica, rel)
    }

    /// Set the modification time of `path` to `age` before now.
    pub fn age(&self, path: &Path, age: Duration) {
        let mtime = SystemTime::now() - age;
        filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap_or_else(|e| {
            panic!("TestTree::age: failed to set mtime of {}: {e}", path.display())
        });
    }

    /// Copy the modification time of one file onto another.
    pub fn match_mtime(&self, from: &Path, to: &Path) {
        let meta = fs::metadata(from).unwrap();
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(to, mtime).unwrap();
    }

    pub fn read_replica(&self, rel: &str) -> String {
        let path = self.replica.join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Listing of the source tree.
    pub fn source_listing(&self) -> Vec<Entry> {
        tree_listing(&self.source)
    }

    /// Listing of the replica tree.
    pub fn replica_listing(&self) -> Vec<Entry> {
        tree_listing(&self.replica)
    }

    /// Assert that the replica holds exactly the source's directories and
    /// files, with identical content.
    ///
    /// # Panics
    /// Panics with both listings if they differ.
    pub fn assert_mirrored(&self) {
        let source = self.source_listing();
        let replica = self.replica_listing();
        assert!(
            source == replica,
            "Replica does not mirror source.\nSource:  {:?}\nReplica: {:?}",
            paths(&source),
            paths(&replica)
        );
    }

    /// Assert that `rel` exists in the replica.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_replica_exists(&self, rel: &str) {
        let full_path = self.replica.join(rel);
        assert!(
            full_path.exists(),
            "Expected replica entry to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist in the replica.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_replica_not_exists(&self, rel: &str) {
        let full_path = self.replica.join(rel);
        assert!(
            !full_path.exists(),
            "Expected replica entry NOT to exist: {}",
            full_path.display()
        );
    }
}

fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content)
        .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", path.display()));
    path
}

fn make_dir(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(&path)
        .unwrap_or_else(|e| panic!("make_dir: failed to create {}: {e}", path.display()));
    path
}

fn paths(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(Entry::path).collect()
}
