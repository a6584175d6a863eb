//! Run baseline
//!
//! The baseline is the manifest and HTML shell a run starts from: the local
//! artifact directory in local mode, or the deployed copies at the configured
//! origin in remote modes. A missing or broken manifest starts the run from
//! scratch; a missing remote shell is fatal.

use std::future::Future;
use std::path::Path;

use crate::config::{defaults, ProjectConfig, RunMode};
use crate::core::meta::Manifest;
use crate::error::{FetchError, MfeError};
use crate::infra::filesystem;

/// Remote artifact fetching
pub trait Baseline {
    /// Fetch a text document
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Load the manifest a run starts from
pub async fn load_manifest<F: Baseline>(
    fetcher: &F,
    config: &ProjectConfig,
    mode: RunMode,
    root: &Path,
) -> Result<Manifest, MfeError> {
    let Some(origin) = config.origin(mode)? else {
        return Ok(Manifest::load_local(&config.dist_dir(root)));
    };

    let url = format!("{origin}{}", defaults::META_FILE);
    tracing::info!("Fetching baseline manifest from {url}");
    let manifest = match fetcher.fetch(&url).await {
        Ok(body) => Manifest::from_json(&body).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed remote manifest: {e}");
            Manifest::default()
        }),
        Err(e) => {
            tracing::warn!("Starting without a baseline manifest: {e}");
            Manifest::default()
        }
    };
    Ok(manifest)
}

/// Load the HTML shell the import map is injected into
///
/// A container rebuilt this run has just emitted a fresh shell locally. A
/// project that has never built its container has no local shell, which
/// yields `None`.
pub async fn load_html<F: Baseline>(
    fetcher: &F,
    config: &ProjectConfig,
    mode: RunMode,
    root: &Path,
    container_rebuilt: bool,
) -> Result<Option<String>, MfeError> {
    let origin = config.origin(mode)?;
    match origin {
        Some(origin) if !container_rebuilt => {
            let url = format!("{origin}{}", defaults::HTML_FILE);
            tracing::info!("Fetching HTML shell from {url}");
            Ok(Some(fetcher.fetch(&url).await?))
        }
        _ => {
            let path = config.dist_dir(root).join(defaults::HTML_FILE);
            if !path.exists() {
                tracing::warn!("No HTML shell at {}, skipping import map", path.display());
                return Ok(None);
            }
            Ok(Some(filesystem::read_file(&path)?))
        }
    }
}
