//! package.json discovery
//!
//! Local packages are read from `packages/<id>/package.json`, installed
//! vendors from `node_modules/<name>/package.json`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::package::{PackageDescriptor, PackageSource};
use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    mfe: MfeField,
}

#[derive(Debug, Default, Deserialize)]
struct MfeField {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Reads package.json files below the project root
#[derive(Debug, Clone)]
pub struct FsPackageSource {
    root: PathBuf,
}

impl FsPackageSource {
    /// Create a source rooted at the project root
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn read(path: &Path) -> Result<PackageJson, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Descriptor {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Descriptor {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

impl PackageSource for FsPackageSource {
    fn descriptor(&self, package_id: &str) -> Result<PackageDescriptor, ConfigError> {
        let path = self
            .root
            .join(defaults::PACKAGES_DIR)
            .join(package_id)
            .join("package.json");
        let json = Self::read(&path)?;

        Ok(PackageDescriptor {
            id: package_id.to_string(),
            name: json.name.unwrap_or_else(|| package_id.to_string()),
            kind: json.mfe.kind,
            main: json.main.unwrap_or_else(|| defaults::DEFAULT_MAIN.to_string()),
            dependencies: json.dependencies.into_keys().collect(),
        })
    }

    fn peer_dependencies(&self, vendor: &str) -> Result<Vec<String>, ConfigError> {
        let path = self
            .root
            .join(defaults::NODE_MODULES_DIR)
            .join(vendor)
            .join("package.json");
        if !path.exists() {
            tracing::debug!("{vendor} is not installed, assuming no peer dependencies");
            return Ok(Vec::new());
        }
        Ok(Self::read(&path)?.peer_dependencies.into_keys().collect())
    }
}
