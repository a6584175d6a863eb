//! Per-run state
//!
//! Everything a run mutates or memoizes lives in one [`RunContext`] created
//! at the start of the run and dropped at its end, so runs never share state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ProjectConfig, RunMode};
use crate::core::bundler::{Alias, BuildRequest, BuildStrategy, Entry, Externals, OutputNaming};
use crate::core::meta::{Manifest, MetaStore};
use crate::core::package::{PackageCatalog, PackageSource, Scope};
use crate::core::vendor_graph::VendorGraph;

/// State of one orchestrator run
#[derive(Debug)]
pub struct RunContext {
    /// Project root
    pub root: PathBuf,
    /// Project configuration
    pub config: ProjectConfig,
    /// Run mode
    pub mode: RunMode,
    /// Scope of local packages
    pub scope: Scope,
    /// Manifest as loaded at run start
    pub baseline: Manifest,
    /// Live manifest
    pub store: MetaStore,
    /// Package lookups
    pub catalog: PackageCatalog,
    /// Vendor graph, filled once local builds settle
    pub graph: VendorGraph,
    /// Shared packages already dispatched this run
    pub built: HashSet<String>,
    /// Name of the container package, if one changed
    pub container: Option<String>,
}

impl RunContext {
    /// Create the context of a run from the loaded manifest
    pub fn new(
        root: &Path,
        config: ProjectConfig,
        mode: RunMode,
        manifest: Manifest,
        packages: Arc<dyn PackageSource>,
    ) -> Self {
        let scope = Scope::new(&config.scope);
        let dist = config.dist_dir(root);
        let overrides = config
            .packages
            .iter()
            .filter_map(|(id, o)| o.kind.clone().map(|kind| (id.clone(), kind)))
            .collect();

        Self {
            root: root.to_path_buf(),
            catalog: PackageCatalog::new(packages, root.to_path_buf(), scope.clone(), overrides),
            store: MetaStore::new(manifest.clone(), dist, !mode.is_remote()),
            baseline: manifest,
            graph: VendorGraph::new(),
            built: HashSet::new(),
            container: None,
            scope,
            config,
            mode,
        }
    }

    /// Artifact directory
    pub fn dist(&self) -> PathBuf {
        self.config.dist_dir(&self.root)
    }

    /// Whether the container package is rebuilt this run
    pub fn container_rebuilt(&self) -> bool {
        self.container
            .as_ref()
            .is_some_and(|name| self.built.contains(name))
    }

    /// Build request for a local package entry
    pub fn local_request(
        &self,
        module: String,
        strategy: BuildStrategy,
        entry: String,
        aliases: Vec<Alias>,
        externals: Externals,
    ) -> BuildRequest {
        BuildRequest {
            module,
            strategy,
            entry: Entry::File { path: entry },
            aliases,
            externals,
            output: OutputNaming::local(&self.config.assets),
            out_dir: self.dist(),
            sourcemap: self.config.build.sourcemap,
            minify: self.config.build.minify,
        }
    }

    /// Build request for a vendor chunk
    pub fn vendor_request(&self, vendor: &str, source: String, externals: Externals) -> BuildRequest {
        BuildRequest {
            module: vendor.to_string(),
            strategy: BuildStrategy::Vendor,
            entry: Entry::Virtual {
                id: crate::config::defaults::VENDOR_ENTRY.to_string(),
                source,
            },
            aliases: Vec::new(),
            externals,
            output: OutputNaming::vendor(&self.config.assets, vendor),
            out_dir: self.dist(),
            sourcemap: self.config.build.sourcemap,
            minify: self.config.build.minify,
        }
    }
}
