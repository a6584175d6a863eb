//! Error types for mfe-build
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Project and package configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Package declares no build type
    #[error("Package '{package}' has no build type (expected pages, components, utils or container)")]
    MissingPackageType { package: String },

    /// Package declares a build type the dispatcher cannot route
    #[error("Package '{package}' declares unknown build type '{kind}'")]
    UnknownPackageType { package: String, kind: String },

    /// Package descriptor could not be read or parsed
    #[error("Failed to read package descriptor '{path}': {error}")]
    Descriptor { path: PathBuf, error: String },

    /// Project config file could not be parsed
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Remote run mode without an origin URL
    #[error("No remote origin configured for run mode '{mode}'")]
    MissingOrigin { mode: String },

    /// Unknown run mode name
    #[error("Unknown run mode '{0}' (expected local, staged or production)")]
    UnknownMode(String),

    /// Local package named outside the configured scope
    #[error("Package '{package}' is named '{name}', which is outside scope '{scope}'")]
    OutsideScope {
        package: String,
        name: String,
        scope: String,
    },

    /// Changed path outside the `packages/<id>/` layout
    #[error("Path '{path}' is not inside a package directory")]
    NotAPackagePath { path: String },
}

/// Errors surfaced by the bundler collaborator
#[derive(Error, Debug)]
pub enum BundlerError {
    /// Bundler program not found on PATH
    #[error("Bundler program '{program}' not found")]
    NotFound { program: String },

    /// Bundler process could not be started or awaited
    #[error("Failed to run bundler for '{module}': {error}")]
    Spawn { module: String, error: String },

    /// Bundler exited with a failure status
    #[error("Build failed for '{module}' ({status}): {stderr}")]
    Failed {
        module: String,
        status: String,
        stderr: String,
    },

    /// Bundler report could not be decoded
    #[error("Invalid bundler report for '{module}': {error}")]
    InvalidReport { module: String, error: String },

    /// Bundler report has no entry chunk
    #[error("Bundler emitted no entry chunk for '{module}'")]
    MissingEntry { module: String },
}

/// Remote baseline fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network error
    #[error("Network error fetching '{url}': {error}")]
    Network { url: String, error: String },

    /// Non-success HTTP status
    #[error("Fetching '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Max retries exceeded
    #[error("Fetch failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Vendor dependency graph errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Peer dependencies form a cycle
    #[error("Circular peer dependency detected: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

/// Revision control errors
#[derive(Error, Debug)]
pub enum RevisionError {
    /// Not a git repository
    #[error("Invalid repository at '{path}': {error}")]
    InvalidRepository { path: PathBuf, error: String },

    /// HEAD could not be resolved
    #[error("Failed to resolve HEAD: {error}")]
    ResolveHead { error: String },

    /// Diff between revisions failed
    #[error("Failed to diff '{from}' against HEAD: {error}")]
    Diff { from: String, error: String },

    /// Source tree walk failed
    #[error("Failed to list sources under '{path}': {error}")]
    Walk { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level mfe-build error type
#[derive(Error, Debug)]
pub enum MfeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bundler error
    #[error("Bundler error: {0}")]
    Bundler(#[from] BundlerError),

    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Graph error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Revision error
    #[error("Revision error: {0}")]
    Revision(#[from] RevisionError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Invalid search pattern
    #[error("Invalid pattern '{pattern}': {error}")]
    InvalidPattern {
        pattern: &'static str,
        error: String,
    },

    /// Manifest or registry serialization error
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
}
