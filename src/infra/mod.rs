//! Infrastructure layer
//!
//! Production implementations of the run collaborators: the bundler process,
//! git, package.json discovery and remote fetching, plus filesystem helpers.
//! This module is the only place where side effects occur, apart from asset
//! eviction in the metadata store.

pub mod bundler;
pub mod filesystem;
pub mod git;
pub mod packages;
pub mod remote;
