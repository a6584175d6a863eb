//! Module metadata manifest (`meta.json`)
//!
//! The manifest records, for every emitted module, where its entry chunk and
//! stylesheet live and which symbols it imports from other modules, plus the
//! source revision the artifacts reflect. It is the only state carried from
//! one run to the next.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::error::{FilesystemError, MfeError};
use crate::infra::filesystem;

/// Emitted module metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Root-absolute path of the entry chunk
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub js: String,

    /// Root-absolute path of the stylesheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,

    /// Imported module -> imported symbols
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: BTreeMap<String, BTreeSet<String>>,
}

impl ModuleRecord {
    /// Emitted asset paths of this record
    pub fn asset_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        if !self.js.is_empty() {
            paths.push(self.js.as_str());
        }
        if let Some(css) = &self.css {
            paths.push(css.as_str());
        }
        paths
    }

    /// Symbols this module imports from `module`
    pub fn imported_from(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.imports.get(module)
    }
}

/// Persisted manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Source revision the manifest reflects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Module name -> record
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleRecord>,
}

/// Registry entry exposed to the running application
#[derive(Debug, Serialize)]
pub struct RegistryEntry<'a> {
    js: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    css: Option<&'a str>,
}

impl Manifest {
    /// Parse from JSON string
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Serialize to pretty JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read `meta.json` from the artifact directory
    ///
    /// A missing or unreadable manifest yields an empty one.
    pub fn load_local(dist: &Path) -> Self {
        let path = dist.join(defaults::META_FILE);
        if !path.exists() {
            tracing::info!("No manifest at {}, starting from scratch", path.display());
            return Self::default();
        }

        match filesystem::read_file(&path).map(|content| Self::from_json(&content)) {
            Ok(Ok(manifest)) => manifest,
            Ok(Err(e)) => {
                tracing::warn!("Ignoring malformed manifest {}: {e}", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable manifest: {e}");
                Self::default()
            }
        }
    }

    /// Module name -> entry chunk path
    pub fn import_map(&self) -> BTreeMap<&str, &str> {
        self.modules
            .iter()
            .filter(|(_, record)| !record.js.is_empty())
            .map(|(name, record)| (name.as_str(), record.js.as_str()))
            .collect()
    }

    /// Module name -> asset paths, without import usage
    pub fn registry(&self) -> BTreeMap<&str, RegistryEntry<'_>> {
        self.modules
            .iter()
            .filter(|(_, record)| !record.js.is_empty())
            .map(|(name, record)| {
                (
                    name.as_str(),
                    RegistryEntry {
                        js: &record.js,
                        css: record.css.as_deref(),
                    },
                )
            })
            .collect()
    }
}

/// Live manifest of a run
#[derive(Debug)]
pub struct MetaStore {
    manifest: Manifest,
    dist: PathBuf,
    delete_files: bool,
}

impl MetaStore {
    /// Wrap a loaded manifest
    ///
    /// `delete_files` controls whether evicted assets are removed from `dist`.
    pub fn new(manifest: Manifest, dist: PathBuf, delete_files: bool) -> Self {
        Self {
            manifest,
            dist,
            delete_files,
        }
    }

    /// Record for `name`, inserted empty on first access
    pub fn get(&mut self, name: &str) -> &mut ModuleRecord {
        self.manifest.modules.entry(name.to_string()).or_default()
    }

    /// Existing record for `name`
    pub fn record(&self, name: &str) -> Option<&ModuleRecord> {
        self.manifest.modules.get(name)
    }

    /// Whether `name` has a record
    pub fn contains(&self, name: &str) -> bool {
        self.manifest.modules.contains_key(name)
    }

    /// Names of all records
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.manifest.modules.keys().map(String::as_str)
    }

    /// Evict a module: delete its emitted assets (unless disabled) and drop
    /// its record. Deletion is best-effort.
    pub fn remove(&mut self, name: &str) -> Option<ModuleRecord> {
        let record = self.manifest.modules.remove(name)?;
        if self.delete_files {
            for asset in record.asset_paths() {
                let path = self.dist.join(asset.trim_start_matches('/'));
                match std::fs::remove_file(&path) {
                    Ok(()) => tracing::debug!("Deleted {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => tracing::warn!("Failed to delete {}: {e}", path.display()),
                }
            }
        }
        tracing::info!("Evicted {name}");
        Some(record)
    }

    /// Record the source revision the manifest now reflects
    pub fn set_revision(&mut self, revision: &str) {
        self.manifest.hash = Some(revision.to_string());
    }

    /// Current manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write `meta.json` into the artifact directory
    pub async fn persist(&self) -> Result<(), MfeError> {
        let content = self.manifest.to_json().map_err(|source| MfeError::Serialize {
            what: "manifest",
            source,
        })?;
        self.write(&content).await?;
        Ok(())
    }

    async fn write(&self, content: &str) -> Result<(), FilesystemError> {
        filesystem::write_file_atomic(&self.dist.join(defaults::META_FILE), content).await
    }
}
