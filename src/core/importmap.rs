//! Import map assembly
//!
//! The HTML shell carries two inline scripts: a browser import map resolving
//! every module name to its entry chunk, and a registry exposing the asset
//! paths of every module to the running application. A rebuilt container
//! ships a fresh shell with a placeholder marker; otherwise the previously
//! injected pair is replaced in place.

use regex::{NoExpand, Regex};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::defaults;
use crate::core::meta::Manifest;
use crate::error::MfeError;

#[derive(Serialize)]
struct ImportMap<'a> {
    imports: BTreeMap<&'a str, &'a str>,
}

/// Render the import map and registry scripts for a manifest
pub fn render_fragments(manifest: &Manifest) -> Result<String, MfeError> {
    let import_map = serde_json::to_string(&ImportMap {
        imports: manifest.import_map(),
    })
    .map_err(|source| MfeError::Serialize {
        what: "import map",
        source,
    })?;
    let registry =
        serde_json::to_string(&manifest.registry()).map_err(|source| MfeError::Serialize {
            what: "module registry",
            source,
        })?;

    Ok(format!(
        "<script type=\"importmap\">{import_map}</script>\
         <script>window.mfe = window.mfe || {{}};window.mfe.modules = {registry}</script>"
    ))
}

/// Previously injected import map and registry pair
const INJECTED: &str = r#"(?s)<script type="importmap">.+?<script>window\.mfe.+?</script>"#;

/// Insert rendered fragments into an HTML shell
///
/// Returns `None` when the shell has no injection target.
pub fn inject(
    html: &str,
    fragments: &str,
    container_rebuilt: bool,
) -> Result<Option<String>, MfeError> {
    if container_rebuilt {
        return Ok(html
            .contains(defaults::PLACEHOLDER)
            .then(|| html.replacen(defaults::PLACEHOLDER, fragments, 1)));
    }

    let injected = Regex::new(INJECTED).map_err(|e| MfeError::InvalidPattern {
        pattern: INJECTED,
        error: e.to_string(),
    })?;
    Ok(injected
        .is_match(html)
        .then(|| injected.replace(html, NoExpand(fragments)).into_owned()))
}

/// Render the final HTML, falling back to the unchanged shell
pub fn assemble(html: &str, manifest: &Manifest, container_rebuilt: bool) -> Result<String, MfeError> {
    let fragments = render_fragments(manifest)?;
    Ok(inject(html, &fragments, container_rebuilt)?.unwrap_or_else(|| {
        tracing::warn!("No import map target found in HTML shell, writing it unchanged");
        html.to_string()
    }))
}
