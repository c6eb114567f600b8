//! Filesystem layer for folder-mirror
//!
//! Provides root-relative path handling, tree enumeration, content checksums
//! and the copy/remove primitives the reconciler is built on.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{PathCase, RelativePath, SeenSet};
pub use io::EntryKind;
pub use walk::{list_dirs, list_files, list_non_dirs};
