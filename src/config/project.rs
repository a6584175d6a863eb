//! Project configuration (`mfe.toml`)
//!
//! Holds the scope of local packages, artifact layout, remote baseline
//! origins per run mode, bundler settings, per-package type overrides and
//! vendor entry resolvers. Every key is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::defaults;
use crate::core::vendor_entry::VendorResolver;
use crate::error::ConfigError;

/// Where the prior manifest and HTML shell come from, and whether evicted
/// assets are physically deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Baseline read from the local artifact directory
    #[default]
    Local,
    /// Baseline fetched from the staged origin
    Staged,
    /// Baseline fetched from the production origin
    Production,
}

impl RunMode {
    /// Whether the baseline is fetched from a remote origin
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Staged => write!(f, "staged"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "local" | "dev" => Ok(Self::Local),
            "staged" | "qa" => Ok(Self::Staged),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Scope prefix of local package names
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Artifact directory
    #[serde(default = "default_dist")]
    pub dist: PathBuf,

    /// Asset directory inside `dist`
    #[serde(default = "default_assets")]
    pub assets: String,

    /// Remote baseline origins
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Bundler settings
    #[serde(default)]
    pub build: BuildSettings,

    /// Per-package overrides keyed by package id (directory name)
    #[serde(default)]
    pub packages: BTreeMap<String, PackageOverride>,

    /// Vendor entry resolvers keyed by vendor package name
    #[serde(default)]
    pub resolvers: BTreeMap<String, VendorResolver>,
}

fn default_scope() -> String {
    defaults::DEFAULT_SCOPE.to_string()
}

fn default_dist() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_DIST)
}

fn default_assets() -> String {
    defaults::DEFAULT_ASSETS.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            dist: default_dist(),
            assets: default_assets(),
            remote: RemoteConfig::default(),
            build: BuildSettings::default(),
            packages: BTreeMap::new(),
            resolvers: BTreeMap::new(),
        }
    }
}

/// Remote baseline origins
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Origin serving the staged `meta.json` and `index.html`
    pub staged: Option<String>,

    /// Origin serving the production `meta.json` and `index.html`
    pub production: Option<String>,
}

/// Bundler settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSettings {
    /// Emit sourcemaps
    #[serde(default = "default_true")]
    pub sourcemap: bool,

    /// Minify output
    #[serde(default)]
    pub minify: bool,

    /// Bundler command (program followed by arguments)
    #[serde(default = "default_bundler")]
    pub bundler: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_bundler() -> Vec<String> {
    defaults::DEFAULT_BUNDLER
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            sourcemap: true,
            minify: false,
            bundler: default_bundler(),
        }
    }
}

/// Per-package override
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageOverride {
    /// Build type replacing the one declared in package.json
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ProjectConfig {
    /// Load `mfe.toml` from the project root
    ///
    /// A missing file yields the default configuration.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from_path(&root.join(defaults::CONFIG_FILE))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Remote origin for a run mode, normalized to end with `/`
    ///
    /// Local mode has no origin; a remote mode without one is an error.
    pub fn origin(&self, mode: RunMode) -> Result<Option<String>, ConfigError> {
        let origin = match mode {
            RunMode::Local => return Ok(None),
            RunMode::Staged => self.remote.staged.as_deref(),
            RunMode::Production => self.remote.production.as_deref(),
        };

        match origin {
            Some(url) if url.ends_with('/') => Ok(Some(url.to_string())),
            Some(url) => Ok(Some(format!("{url}/"))),
            None => Err(ConfigError::MissingOrigin {
                mode: mode.to_string(),
            }),
        }
    }

    /// Artifact directory resolved against the project root
    pub fn dist_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::load(temp.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.scope, "@vue-mfe");
        assert!(config.build.sourcemap);
        assert!(!config.build.minify);
    }

    #[test]
    fn test_full_config_parses() {
        let config = ProjectConfig::from_toml(
            r#"
scope = "@shop"
dist = "out"

[remote]
staged = "https://cdn.example.com/qa"

[build]
minify = true
bundler = ["node", "tools/bundle.mjs"]

[packages.home]
type = "pages"

[resolvers.element-plus]
path = "es/components/{kebab}/index.mjs"
strip_prefix = "El"
"#,
        )
        .unwrap();

        assert_eq!(config.scope, "@shop");
        assert_eq!(config.dist, PathBuf::from("out"));
        assert_eq!(config.assets, "assets");
        assert!(config.build.minify);
        assert_eq!(config.build.bundler, vec!["node", "tools/bundle.mjs"]);
        assert_eq!(config.packages["home"].kind.as_deref(), Some("pages"));
        assert!(config.resolvers.contains_key("element-plus"));
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("mfe.toml"), "scope = [").unwrap();
        let err = ProjectConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_origin_is_normalized() {
        let mut config = ProjectConfig::default();
        config.remote.staged = Some("https://cdn.example.com/qa".to_string());
        config.remote.production = Some("https://cdn.example.com/prod/".to_string());

        assert_eq!(config.origin(RunMode::Local).unwrap(), None);
        assert_eq!(
            config.origin(RunMode::Staged).unwrap().as_deref(),
            Some("https://cdn.example.com/qa/")
        );
        assert_eq!(
            config.origin(RunMode::Production).unwrap().as_deref(),
            Some("https://cdn.example.com/prod/")
        );
    }

    #[test]
    fn test_missing_origin_is_error() {
        let config = ProjectConfig::default();
        assert!(matches!(
            config.origin(RunMode::Production),
            Err(ConfigError::MissingOrigin { .. })
        ));
    }

    #[test]
    fn test_run_mode_aliases() {
        assert_eq!("".parse::<RunMode>().unwrap(), RunMode::Local);
        assert_eq!("qa".parse::<RunMode>().unwrap(), RunMode::Staged);
        assert_eq!("PROD".parse::<RunMode>().unwrap(), RunMode::Production);
        assert!("nightly".parse::<RunMode>().is_err());
        assert!(RunMode::Staged.is_remote());
        assert!(!RunMode::Local.is_remote());
    }
}
