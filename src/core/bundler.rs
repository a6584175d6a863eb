//! Bundler contract
//!
//! The bundler turns one entry into hashed output files. The orchestrator
//! describes each build with a [`BuildRequest`] and learns what was emitted,
//! and which external symbols the compiled graph imports, from the returned
//! [`BundleReport`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::path::PathBuf;

use crate::core::meta::ModuleRecord;
use crate::error::BundlerError;

/// How the bundler treats the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStrategy {
    /// ES module library build (pages, components, utils)
    Library,
    /// Application shell build emitting `index.html`
    Container,
    /// Shared vendor chunk from a synthetic entry
    Vendor,
}

/// Entry of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    /// Project-relative source file
    File { path: String },
    /// Synthetic module with inline source
    Virtual { id: String, source: String },
}

/// Path alias passed to the bundler's resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Specifier to match, literal or regular expression
    pub find: String,
    /// Whether `find` is a regular expression
    pub regex: bool,
    /// Replacement; may reference regex captures as `$1`
    pub replacement: String,
}

impl Alias {
    /// Literal alias
    pub fn exact(find: String, replacement: String) -> Self {
        Self {
            find,
            regex: false,
            replacement,
        }
    }

    /// Regular expression alias
    pub fn pattern(find: String, replacement: String) -> Self {
        Self {
            find,
            regex: true,
            replacement,
        }
    }
}

/// Modules the bundler must leave as imports instead of inlining
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Externals {
    /// Exact module names
    pub names: Vec<String>,
    /// Module name prefixes
    pub prefixes: Vec<String>,
}

impl Externals {
    /// Exact names only
    pub fn names(names: Vec<String>) -> Self {
        Self {
            names,
            prefixes: Vec::new(),
        }
    }

    /// Whether a module specifier is external
    pub fn contains(&self, module: &str) -> bool {
        self.names.iter().any(|n| n == module)
            || self.prefixes.iter().any(|p| module.starts_with(p.as_str()))
    }
}

/// Output file naming patterns (`[name]`, `[hash]`, `[extname]` placeholders)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNaming {
    /// Entry chunk file names
    pub entry_file_names: String,
    /// Shared chunk file names
    pub chunk_file_names: String,
    /// Asset file names
    pub asset_file_names: String,
}

impl OutputNaming {
    /// Naming used by local package builds
    pub fn local(assets: &str) -> Self {
        Self {
            entry_file_names: format!("{assets}/[name]-[hash].js"),
            chunk_file_names: format!("{assets}/[name]-[hash].js"),
            asset_file_names: format!("{assets}/[name]-[hash][extname]"),
        }
    }

    /// Naming used by vendor chunks, keyed by vendor name
    pub fn vendor(assets: &str, vendor: &str) -> Self {
        Self {
            entry_file_names: format!("{assets}/{vendor}.[hash].js"),
            chunk_file_names: format!("{assets}/{vendor}.[hash].js"),
            asset_file_names: format!("{assets}/{vendor}.[hash][extname]"),
        }
    }
}

/// One bundler invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Module name the outputs are recorded under
    pub module: String,
    /// Build strategy
    pub strategy: BuildStrategy,
    /// Entry reference
    pub entry: Entry,
    /// Resolver aliases
    pub aliases: Vec<Alias>,
    /// External modules
    pub externals: Externals,
    /// Output naming scheme
    pub output: OutputNaming,
    /// Output directory
    pub out_dir: PathBuf,
    /// Emit sourcemaps
    pub sourcemap: bool,
    /// Minify output
    pub minify: bool,
}

/// One emitted file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputChunk {
    /// File name relative to the output directory
    pub file_name: String,
    /// Whether this is the entry chunk
    #[serde(default)]
    pub is_entry: bool,
    /// External module -> imported symbols, for JavaScript chunks
    #[serde(default)]
    pub imports: BTreeMap<String, BTreeSet<String>>,
}

impl OutputChunk {
    /// Whether this output is a stylesheet
    pub fn is_stylesheet(&self) -> bool {
        self.file_name.ends_with(".css")
    }
}

/// Bundler result for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleReport {
    /// Emitted files
    pub outputs: Vec<OutputChunk>,
}

impl BundleReport {
    /// Module record described by this report
    ///
    /// The entry chunk becomes `js`, the first stylesheet `css`, and the
    /// entry's observed imports `imports`.
    pub fn into_record(self, module: &str) -> Result<ModuleRecord, BundlerError> {
        let css = self
            .outputs
            .iter()
            .find(|o| o.is_stylesheet())
            .map(|o| asset_path(&o.file_name));
        let entry = self
            .outputs
            .into_iter()
            .find(|o| o.is_entry)
            .ok_or_else(|| BundlerError::MissingEntry {
                module: module.to_string(),
            })?;

        Ok(ModuleRecord {
            js: asset_path(&entry.file_name),
            css,
            imports: entry.imports,
        })
    }
}

fn asset_path(file_name: &str) -> String {
    format!("/{}", file_name.trim_start_matches('/'))
}

/// Module-graph compiler
pub trait Bundler {
    /// Compile one entry
    fn build(
        &self,
        request: BuildRequest,
    ) -> impl Future<Output = Result<BundleReport, BundlerError>> + Send;
}
