//! Core business logic module
//!
//! This module contains the build orchestration logic for mfe-build.
//! Collaborators with side effects (bundler, git, package.json discovery,
//! remote fetching) are reached through traits implemented in
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`changes`] - Change set resolution
//! - [`meta`] - Module metadata manifest and store
//! - [`package`] - Local package descriptors and derived build inputs
//! - [`bundler`] - Bundler contract
//! - [`dispatch`] - Routing changed sources to builds
//! - [`vendor_graph`] - Peer dependency graph over vendor packages
//! - [`exports`] - Vendor export aggregation
//! - [`vendor_entry`] - Synthetic vendor entry rendering
//! - [`importmap`] - Import map assembly
//! - [`baseline`] - Manifest and HTML shell a run starts from
//! - [`context`] - Per-run state
//! - [`cache`] - Derived value memoization
//! - [`orchestrator`] - Run control flow

pub mod baseline;
pub mod bundler;
pub mod cache;
pub mod changes;
pub mod context;
pub mod dispatch;
pub mod exports;
pub mod importmap;
pub mod meta;
pub mod orchestrator;
pub mod package;
pub mod vendor_entry;
pub mod vendor_graph;
