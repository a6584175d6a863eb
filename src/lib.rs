//! mfe-build - Incremental micro-frontend build orchestrator
//!
//! Builds a multi-package front-end application incrementally: only packages
//! whose sources changed since the last build are recompiled, shared vendor
//! code lives in chunks that re-export exactly the symbols consumers use, and
//! a browser import map ties the emitted modules together.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Build orchestration logic and collaborator contracts
//! - [`infra`] - Infrastructure layer (bundler process, git, network, filesystem)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
