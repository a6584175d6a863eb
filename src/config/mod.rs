//! Configuration and constants
//!
//! - [`defaults`] - Default values and well-known file names
//! - [`project`] - Project configuration (`mfe.toml`) and run modes

pub mod defaults;
pub mod project;

pub use project::{ProjectConfig, RunMode};
