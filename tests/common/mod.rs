//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a temporary
//! project layout plus scripted stand-ins for git and the bundler.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mfe_build::config::defaults;
use mfe_build::core::baseline::Baseline;
use mfe_build::core::bundler::{BuildRequest, BuildStrategy, BundleReport, Bundler, Entry, OutputChunk};
use mfe_build::core::changes::{Revisions, SourceChange};
use mfe_build::core::meta::Manifest;
use mfe_build::core::orchestrator::{Orchestrator, RunOptions};
use mfe_build::error::{BundlerError, FetchError, RevisionError};
use mfe_build::infra::packages::FsPackageSource;
use mfe_build::config::RunMode;
use tempfile::TempDir;

/// HTML shell emitted by container builds
pub const SHELL: &str = "<html><head><!-- mfe placeholder --></head><body></body></html>";

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write `packages/<id>/package.json` for `@vue-mfe/<id>`
    pub fn add_package(&self, id: &str, kind: &str, dependencies: &[&str]) {
        let deps: BTreeMap<&str, &str> = dependencies.iter().map(|d| (*d, "*")).collect();
        let json = serde_json::json!({
            "name": format!("@vue-mfe/{id}"),
            "main": "./src/index.ts",
            "mfe": { "type": kind },
            "dependencies": deps,
        });
        self.create_file(&format!("packages/{id}/package.json"), &json.to_string());
    }

    /// Write `node_modules/<name>/package.json` declaring `peers`
    pub fn add_vendor(&self, name: &str, peers: &[&str]) {
        let peers: BTreeMap<&str, &str> = peers.iter().map(|p| (*p, "*")).collect();
        let json = serde_json::json!({ "name": name, "peerDependencies": peers });
        self.create_file(&format!("node_modules/{name}/package.json"), &json.to_string());
    }

    /// Persisted manifest
    pub fn manifest(&self) -> Manifest {
        Manifest::from_json(&self.read_file("dist/meta.json")).expect("Failed to parse meta.json")
    }

    /// Whether the asset at a root-absolute path exists in `dist`
    pub fn asset_exists(&self, asset: &str) -> bool {
        self.file_exists(&format!("dist{asset}"))
    }

    /// Local-mode run options
    pub fn options(&self) -> RunOptions {
        RunOptions {
            root: self.path(),
            mode: RunMode::Local,
            jobs: 4,
        }
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Revision control whose history is advanced by the test
pub struct ScriptedRevisions {
    state: Mutex<(String, Vec<SourceChange>)>,
    sources: Vec<String>,
}

impl ScriptedRevisions {
    /// Start at `revision` with `sources` in the tree
    pub fn new(revision: &str, sources: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new((revision.to_string(), Vec::new())),
            sources: sources.iter().map(ToString::to_string).collect(),
        })
    }

    /// Move HEAD to `revision`, changing `changes` since the previous one
    pub fn commit(&self, revision: &str, changes: Vec<SourceChange>) {
        *self.state.lock().unwrap() = (revision.to_string(), changes);
    }
}

impl Revisions for ScriptedRevisions {
    fn current(&self) -> Result<String, RevisionError> {
        Ok(self.state.lock().unwrap().0.clone())
    }

    fn diff(&self, _from: &str) -> Result<Vec<SourceChange>, RevisionError> {
        Ok(self.state.lock().unwrap().1.clone())
    }

    fn sources(&self) -> Result<Vec<String>, RevisionError> {
        Ok(self.sources.clone())
    }
}

/// Bundler writing placeholder outputs to disk
///
/// Imports reported per module are set by the test and may change between
/// runs. Output file names hash the module name, the entry and the number of
/// edits to the module, so an unchanged vendor entry yields an unchanged path.
#[derive(Default)]
pub struct RecordingBundler {
    imports: Mutex<HashMap<String, BTreeMap<String, BTreeSet<String>>>>,
    edits: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<BuildRequest>>,
}

impl RecordingBundler {
    /// Report `module` as importing `symbols` from `from`
    ///
    /// No symbols means a side-effect import.
    pub fn set_imports(&self, module: &str, from: &str, symbols: &[&str]) {
        self.imports
            .lock()
            .unwrap()
            .entry(module.to_string())
            .or_default()
            .insert(from.to_string(), symbols.iter().map(ToString::to_string).collect());
    }

    /// Stop reporting any import of `from` by `module`
    pub fn drop_import(&self, module: &str, from: &str) {
        if let Some(entry) = self.imports.lock().unwrap().get_mut(module) {
            entry.remove(from);
        }
    }

    /// Change the content of `module`, so its next output gets a new hash
    pub fn edit(&self, module: &str) {
        *self.edits.lock().unwrap().entry(module.to_string()).or_default() += 1;
    }

    /// Modules built since the last call
    pub fn take_built(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap();
        let mut built: Vec<String> = requests.drain(..).map(|r| r.module).collect();
        built.sort();
        built
    }

    /// Synthetic entry source of the last build of `vendor`
    pub fn vendor_source(&self, vendor: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|req| match &req.entry {
                Entry::Virtual { source, .. } if req.module == vendor => Some(source.clone()),
                _ => None,
            })
    }

    fn emit(&self, request: BuildRequest) -> Result<BundleReport, BundlerError> {
        let (stem, fingerprint) = match &request.entry {
            Entry::File { path } => {
                let file = path.rsplit('/').next().unwrap_or(path);
                (file.split('.').next().unwrap_or(file).to_string(), path.clone())
            }
            Entry::Virtual { id, source } => (id.clone(), source.clone()),
        };
        let edits = self
            .edits
            .lock()
            .unwrap()
            .get(&request.module)
            .copied()
            .unwrap_or_default();
        let hash = fnv(&format!("{}\0{fingerprint}\0{edits}", request.module));
        let file_name = request
            .output
            .entry_file_names
            .replace("[name]", &stem)
            .replace("[hash]", &hash);

        let path = request.out_dir.join(&file_name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("// {}", request.module)).unwrap();
        if request.strategy == BuildStrategy::Container {
            std::fs::write(request.out_dir.join(defaults::HTML_FILE), SHELL).unwrap();
        }

        let imports = self
            .imports
            .lock()
            .unwrap()
            .get(&request.module)
            .cloned()
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request);

        Ok(BundleReport {
            outputs: vec![OutputChunk {
                file_name,
                is_entry: true,
                imports,
            }],
        })
    }
}

impl Bundler for RecordingBundler {
    fn build(
        &self,
        request: BuildRequest,
    ) -> impl Future<Output = Result<BundleReport, BundlerError>> + Send {
        let result = self.emit(request);
        async move { result }
    }
}

fn fnv(input: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in input.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("{hash:08x}")
}

/// Baseline for local runs; every fetch fails
pub struct Offline;

impl Baseline for Offline {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        let err = FetchError::Network {
            url: url.to_string(),
            error: "offline".to_string(),
        };
        async move { Err(err) }
    }
}

/// Orchestrator over a test project with scripted git and bundler
pub fn orchestrator(
    project: &TestProject,
    revisions: &Arc<ScriptedRevisions>,
) -> Orchestrator<RecordingBundler, Offline> {
    Orchestrator::new(
        RecordingBundler::default(),
        Offline,
        revisions.clone(),
        Arc::new(FsPackageSource::new(project.path())),
    )
}
