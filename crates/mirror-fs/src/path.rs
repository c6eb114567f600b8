//! Root-relative path handling and case policy

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// A path relative to either the source or the replica root.
///
/// Keeps the native relative path for I/O and matching, and a forward-slash
/// rendering for log output. Names that are not valid UTF-8 render lossily
/// but still match on their exact bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    /// Forward-slash rendering, used for display
    normalized: String,
    /// Native relative path, used when joining onto a root
    native: PathBuf,
}

impl RelativePath {
    /// Create a RelativePath from a relative path.
    ///
    /// Root, prefix, `.` and `..` components are dropped; only normal
    /// components are kept.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut native = PathBuf::new();
        let mut parts = Vec::new();
        for component in path.as_ref().components() {
            if let Component::Normal(part) = component {
                native.push(part);
                parts.push(part.to_string_lossy().into_owned());
            }
        }
        Self {
            normalized: parts.join("/"),
            native,
        }
    }

    /// Compute the path of `full` relative to `root`.
    ///
    /// Returns `None` if `full` does not live under `root`.
    pub fn from_root(root: &Path, full: &Path) -> Option<Self> {
        full.strip_prefix(root).ok().map(Self::new)
    }

    /// Get the forward-slash string representation.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Native components joined with `/`, exact even for names that are
    /// not valid UTF-8.
    pub fn native_key(&self) -> OsString {
        let mut key = OsString::with_capacity(self.native.as_os_str().len());
        for (i, part) in self.native.iter().enumerate() {
            if i > 0 {
                key.push("/");
            }
            key.push(part);
        }
        key
    }

    /// Get the native relative path.
    pub fn as_path(&self) -> &Path {
        &self.native
    }

    /// Resolve this path under the given root.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(&self.native)
    }

    /// Get the parent directory, or `None` for a top-level entry.
    pub fn parent(&self) -> Option<Self> {
        let parent = self.native.parent()?;
        if parent.as_os_str().is_empty() {
            None
        } else {
            Some(Self::new(parent))
        }
    }

    /// Get the final component.
    pub fn file_name(&self) -> Option<&str> {
        self.normalized.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Length of the string rendering, used as a depth proxy.
    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    /// Whether this is the empty path (the root itself).
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for RelativePath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// How relative paths are compared when matching source and replica entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCase {
    /// `a.txt` and `A.txt` are different entries
    Sensitive,
    /// `a.txt` and `A.txt` are the same entry
    Insensitive,
}

impl PathCase {
    /// Case policy matching the usual filesystem of the build target.
    ///
    /// Windows and macOS filesystems are case-insensitive by default.
    pub fn platform_default() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    /// Comparison key for a relative path under this policy.
    ///
    /// Case folding only applies to paths that are valid UTF-8; any other
    /// path is matched on its exact native form.
    pub fn key(self, path: &RelativePath) -> OsString {
        let key = path.native_key();
        match self {
            Self::Sensitive => key,
            Self::Insensitive => match key.to_str() {
                Some(text) => OsString::from(text.to_lowercase()),
                None => key,
            },
        }
    }
}

impl Default for PathCase {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Set of relative paths compared under a [`PathCase`] policy.
///
/// Built fresh for each pass and discarded at the end of it.
#[derive(Debug, Clone)]
pub struct SeenSet {
    case: PathCase,
    keys: HashSet<OsString>,
}

impl SeenSet {
    pub fn new(case: PathCase) -> Self {
        Self {
            case,
            keys: HashSet::new(),
        }
    }

    /// Record a path. Returns `false` if an equivalent path was already present.
    pub fn insert(&mut self, path: &RelativePath) -> bool {
        self.keys.insert(self.case.key(path))
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.keys.contains(&self.case.key(path))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn case(&self) -> PathCase {
        self.case
    }
}
