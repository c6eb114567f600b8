//! Shared test utilities for the folder-mirror workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] with a source and a replica folder
//! - [`snapshot`]: flat listings of a tree for comparing source and replica

pub mod snapshot;
pub mod tree;

pub use snapshot::{Entry, tree_listing};
pub use tree::TestTree;
