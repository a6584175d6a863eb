//! Test utilities
//!
//! Proptest generators and in-memory fakes of the run collaborators.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Generate a vendor package name, plain or scoped
    pub fn vendor_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-z0-9-]{0,12}",
            ("[a-z]{2,8}", "[a-z][a-z0-9-]{0,8}").prop_map(|(scope, name)| format!("@{scope}/{name}")),
        ]
    }

    /// Generate an exported symbol name
    pub fn symbol() -> impl Strategy<Value = String> {
        "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
    }

    /// Generate a non-empty symbol set
    pub fn symbol_set() -> impl Strategy<Value = BTreeSet<String>> {
        proptest::collection::btree_set(symbol(), 1..12)
    }

    /// Generate a short revision id
    pub fn revision() -> impl Strategy<Value = String> {
        "[0-9a-f]{7}"
    }
}

#[cfg(test)]
pub mod fakes {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
    use std::future::Future;
    use std::hash::{Hash, Hasher};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::config::{ProjectConfig, RunMode};
    use crate::core::baseline::Baseline;
    use crate::core::bundler::{BuildRequest, BundleReport, Bundler, Entry, OutputChunk};
    use crate::core::changes::{Revisions, SourceChange};
    use crate::core::context::RunContext;
    use crate::core::meta::Manifest;
    use crate::core::package::{PackageDescriptor, PackageSource};
    use crate::error::{BundlerError, ConfigError, FetchError, RevisionError};

    /// Package descriptors and vendor peers held in memory
    #[derive(Debug, Default)]
    pub struct MemoryPackages {
        packages: HashMap<String, PackageDescriptor>,
        peers: HashMap<String, Vec<String>>,
        lookups: AtomicUsize,
    }

    impl MemoryPackages {
        /// Register a descriptor
        pub fn add_package(&mut self, descriptor: PackageDescriptor) {
            self.packages.insert(descriptor.id.clone(), descriptor);
        }

        /// Register `@vue-mfe/<id>` of `kind` with main `./src/index.ts`
        pub fn add(&mut self, id: &str, kind: &str, dependencies: &[&str]) {
            self.add_package(PackageDescriptor {
                id: id.to_string(),
                name: format!("@vue-mfe/{id}"),
                kind: Some(kind.to_string()),
                main: "./src/index.ts".to_string(),
                dependencies: dependencies.iter().map(ToString::to_string).collect(),
            });
        }

        /// Declare the peer dependencies of a vendor
        pub fn add_peers(&mut self, vendor: &str, peers: &[&str]) {
            self.peers.insert(
                vendor.to_string(),
                peers.iter().map(ToString::to_string).collect(),
            );
        }

        /// Number of descriptor lookups served
        pub fn descriptor_lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl PackageSource for MemoryPackages {
        fn descriptor(&self, package_id: &str) -> Result<PackageDescriptor, ConfigError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.packages
                .get(package_id)
                .cloned()
                .ok_or_else(|| ConfigError::Descriptor {
                    path: PathBuf::from(format!("packages/{package_id}/package.json")),
                    error: "not found".to_string(),
                })
        }

        fn peer_dependencies(&self, vendor: &str) -> Result<Vec<String>, ConfigError> {
            Ok(self.peers.get(vendor).cloned().unwrap_or_default())
        }
    }

    /// Scripted revision control
    #[derive(Debug, Default)]
    pub struct FakeRevisions {
        revision: String,
        diff: Vec<SourceChange>,
        sources: Vec<String>,
    }

    impl FakeRevisions {
        /// Working revision `revision`, no changes
        pub fn new(revision: &str) -> Self {
            Self {
                revision: revision.to_string(),
                ..Default::default()
            }
        }

        /// Changes returned by every diff
        pub fn with_diff(mut self, diff: Vec<SourceChange>) -> Self {
            self.diff = diff;
            self
        }

        /// Files listed on a first run
        pub fn with_sources(mut self, sources: &[&str]) -> Self {
            self.sources = sources.iter().map(ToString::to_string).collect();
            self
        }
    }

    impl Revisions for FakeRevisions {
        fn current(&self) -> Result<String, RevisionError> {
            Ok(self.revision.clone())
        }

        fn diff(&self, _from: &str) -> Result<Vec<SourceChange>, RevisionError> {
            Ok(self.diff.clone())
        }

        fn sources(&self) -> Result<Vec<String>, RevisionError> {
            Ok(self.sources.clone())
        }
    }

    /// Bundler answering from scripted imports
    ///
    /// Output names follow the request's naming pattern, with a hash derived
    /// from the module name and entry, so an unchanged vendor entry keeps its
    /// asset path.
    #[derive(Debug, Default)]
    pub struct FakeBundler {
        imports: HashMap<String, BTreeMap<String, BTreeSet<String>>>,
        failing: HashSet<String>,
        requests: Mutex<Vec<BuildRequest>>,
    }

    impl FakeBundler {
        /// Report `module` as importing `symbols` from `from`
        pub fn importing(mut self, module: &str, from: &str, symbols: &[&str]) -> Self {
            self.imports
                .entry(module.to_string())
                .or_default()
                .insert(
                    from.to_string(),
                    symbols.iter().map(ToString::to_string).collect(),
                );
            self
        }

        /// Fail every build of `module`
        pub fn failing(mut self, module: &str) -> Self {
            self.failing.insert(module.to_string());
            self
        }

        /// Number of builds requested
        pub fn build_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or(0)
        }

        /// Modules built, in request order
        pub fn built(&self) -> Vec<String> {
            self.requests
                .lock()
                .map(|r| r.iter().map(|req| req.module.clone()).collect())
                .unwrap_or_default()
        }

        /// Synthetic entry source of the last build of `vendor`
        pub fn vendor_source(&self, vendor: &str) -> Option<String> {
            let requests = self.requests.lock().ok()?;
            requests.iter().rev().find_map(|req| match &req.entry {
                Entry::Virtual { source, .. } if req.module == vendor => Some(source.clone()),
                _ => None,
            })
        }

        fn respond(&self, request: BuildRequest) -> Result<BundleReport, BundlerError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            if self.failing.contains(&request.module) {
                return Err(BundlerError::Failed {
                    module: request.module,
                    status: "exit status: 1".to_string(),
                    stderr: "scripted failure".to_string(),
                });
            }

            let (stem, fingerprint) = match &request.entry {
                Entry::File { path } => {
                    let file = path.rsplit('/').next().unwrap_or(path);
                    let stem = file.split('.').next().unwrap_or(file).to_string();
                    (stem, path.clone())
                }
                Entry::Virtual { id, source } => (id.clone(), source.clone()),
            };
            let mut hasher = DefaultHasher::new();
            request.module.hash(&mut hasher);
            fingerprint.hash(&mut hasher);
            let hash = format!("{:08x}", hasher.finish() & 0xffff_ffff);

            let file_name = request
                .output
                .entry_file_names
                .replace("[name]", &stem)
                .replace("[hash]", &hash);
            Ok(BundleReport {
                outputs: vec![OutputChunk {
                    file_name,
                    is_entry: true,
                    imports: self.imports.get(&request.module).cloned().unwrap_or_default(),
                }],
            })
        }
    }

    impl Bundler for FakeBundler {
        fn build(
            &self,
            request: BuildRequest,
        ) -> impl Future<Output = Result<BundleReport, BundlerError>> + Send {
            let result = self.respond(request);
            async move { result }
        }
    }

    /// Remote documents held in memory; unknown URLs answer 404
    #[derive(Debug, Default, Clone)]
    pub struct MemoryBaseline {
        documents: HashMap<String, String>,
    }

    impl MemoryBaseline {
        /// Serve `body` at `url`
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.documents.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Baseline for MemoryBaseline {
        fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
            let result = self
                .documents
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            async move { result }
        }
    }

    /// Local-mode run context rooted at `/repo` over `packages`
    pub fn context_with(packages: MemoryPackages, manifest: Manifest) -> RunContext {
        RunContext::new(
            Path::new("/repo"),
            ProjectConfig::default(),
            RunMode::Local,
            manifest,
            Arc::new(packages),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::package::vendor_package_name;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_vendor_name_is_its_own_package(name in vendor_name()) {
            prop_assert_eq!(vendor_package_name(&name), name.as_str());
        }

        #[test]
        fn test_subpath_resolves_to_package(name in vendor_name(), sub in "[a-z]{1,8}") {
            let specifier = format!("{name}/{sub}");
            prop_assert_eq!(vendor_package_name(&specifier), name.as_str());
        }

        #[test]
        fn test_symbol_set_generator(symbols in symbol_set()) {
            prop_assert!(!symbols.is_empty());
            prop_assert!(symbols.iter().all(|s| !s.is_empty()));
        }

        #[test]
        fn test_revision_generator(rev in revision()) {
            prop_assert_eq!(rev.len(), 7);
        }
    }
}
