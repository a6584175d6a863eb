//! Local package descriptors and package-derived build inputs
//!
//! Source files live under `packages/<id>/src/`. Each package directory has a
//! `package.json` declaring its name, build type, main entry and runtime
//! dependencies. Everything a build needs from a package (descriptor, path
//! aliases, externals) is derived once per run through [`PackageCatalog`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::defaults;
use crate::core::bundler::{Alias, Externals};
use crate::core::cache::DerivedCache;
use crate::error::ConfigError;

/// Build type of a local package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// Every source file under `src/` is its own entry
    Pages,
    /// Shared component library, built from its main entry
    Components,
    /// Shared utility library, built from its main entry
    Utils,
    /// The application shell hosting routing and the import map
    Container,
}

impl PackageType {
    /// Resolve the declared type of a package
    pub fn from_descriptor(descriptor: &PackageDescriptor) -> Result<Self, ConfigError> {
        match descriptor.kind.as_deref() {
            Some("pages") => Ok(Self::Pages),
            Some("components") => Ok(Self::Components),
            Some("utils") => Ok(Self::Utils),
            Some("container") => Ok(Self::Container),
            Some(other) => Err(ConfigError::UnknownPackageType {
                package: descriptor.name.clone(),
                kind: other.to_string(),
            }),
            None => Err(ConfigError::MissingPackageType {
                package: descriptor.name.clone(),
            }),
        }
    }

    /// Whether one build covers the whole package
    pub fn is_shared(self) -> bool {
        !matches!(self, Self::Pages)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pages => write!(f, "pages"),
            Self::Components => write!(f, "components"),
            Self::Utils => write!(f, "utils"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// Local package descriptor as read from its package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Package directory name under `packages/`
    pub id: String,
    /// Declared package name
    pub name: String,
    /// Declared build type, unvalidated
    pub kind: Option<String>,
    /// Main entry, relative to the package directory
    pub main: String,
    /// Runtime dependency names
    pub dependencies: Vec<String>,
}

/// Package manifest lookups
pub trait PackageSource: Send + Sync {
    /// Descriptor of the local package in `packages/<package_id>`
    fn descriptor(&self, package_id: &str) -> Result<PackageDescriptor, ConfigError>;

    /// Declared peer dependencies of an installed vendor package
    fn peer_dependencies(&self, vendor: &str) -> Result<Vec<String>, ConfigError>;
}

/// Scope prefix that separates local module names from vendor names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope(String);

impl Scope {
    /// Create a scope from its name, with or without trailing slash
    pub fn new(scope: &str) -> Self {
        Self(scope.trim_end_matches('/').to_string())
    }

    /// Scope as written in package names, e.g. `@vue-mfe`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix every local module name starts with, e.g. `@vue-mfe/`
    pub fn prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// Whether a module name belongs to a local package
    pub fn is_local(&self, module: &str) -> bool {
        module
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Conventional module name of a package id when no descriptor exists
    pub fn conventional_name(&self, package_id: &str) -> String {
        format!("{}/{package_id}", self.0)
    }
}

/// Package id of a path shaped `packages/<id>/<rest>`
pub fn package_id(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(defaults::PACKAGES_DIR)?.strip_prefix('/')?;
    let (id, tail) = rest.split_once('/')?;
    (!id.is_empty() && !tail.is_empty()).then_some(id)
}

/// Whether a path is a source file of some package (`packages/<id>/src/<..>`)
pub fn is_package_source(path: &str) -> bool {
    package_id(path).is_some_and(|id| {
        let prefix_len = defaults::PACKAGES_DIR.len() + id.len() + 2;
        path[prefix_len..]
            .strip_prefix("src/")
            .is_some_and(|file| !file.is_empty())
    })
}

/// Module name of the build unit a source path belongs to
///
/// A page is named by the package name followed by its path inside the
/// package; every other type is named by the package name alone.
pub fn local_module_name(path: &str, descriptor: &PackageDescriptor, kind: PackageType) -> String {
    if kind.is_shared() {
        return descriptor.name.clone();
    }
    let package_dir = format!("{}/{}", defaults::PACKAGES_DIR, descriptor.id);
    match path.strip_prefix(&package_dir) {
        Some(rest) => format!("{}{rest}", descriptor.name),
        None => descriptor.name.clone(),
    }
}

/// Project-relative path of a package's main entry
pub fn main_entry(descriptor: &PackageDescriptor) -> String {
    format!(
        "{}/{}/{}",
        defaults::PACKAGES_DIR,
        descriptor.id,
        descriptor.main.trim_start_matches("./")
    )
}

/// Installed package a vendor import specifier belongs to
///
/// `lodash-es/debounce` belongs to `lodash-es`, `@scope/pkg/sub` to
/// `@scope/pkg`.
pub fn vendor_package_name(specifier: &str) -> &str {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    match specifier.match_indices('/').nth(segments - 1) {
        Some((idx, _)) => &specifier[..idx],
        None => specifier,
    }
}

/// Path aliases of a package
///
/// Every package resolves `@<id>` to its source directory. Pages additionally
/// rewrite `@<id>/<file>.{vue,ts,tsx}` to the scoped module name so sibling
/// pages stay external to each other.
pub fn aliases(root: &Path, scope: &Scope, package_id: &str, kind: PackageType) -> Vec<Alias> {
    let mut aliases = Vec::new();
    if kind == PackageType::Pages {
        aliases.push(Alias::pattern(
            format!("@{package_id}(/.+\\.(vue|ts|tsx))"),
            format!("{}/{package_id}/src$1", scope.as_str()),
        ));
    }
    let src: PathBuf = root
        .join(defaults::PACKAGES_DIR)
        .join(package_id)
        .join("src");
    aliases.push(Alias::exact(
        format!("@{package_id}"),
        src.display().to_string(),
    ));
    aliases
}

/// Modules left external when building a package: its declared dependencies
/// plus every local module.
pub fn externals(descriptor: &PackageDescriptor, scope: &Scope) -> Externals {
    Externals {
        names: descriptor.dependencies.clone(),
        prefixes: vec![scope.prefix()],
    }
}

/// Memoized access to package-derived build inputs for one run
pub struct PackageCatalog {
    source: Arc<dyn PackageSource>,
    root: PathBuf,
    scope: Scope,
    overrides: BTreeMap<String, String>,
    descriptors: DerivedCache<String, Arc<PackageDescriptor>>,
    aliases: DerivedCache<String, Arc<Vec<Alias>>>,
    externals: DerivedCache<String, Arc<Externals>>,
    peers: DerivedCache<String, Arc<Vec<String>>>,
}

impl fmt::Debug for PackageCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageCatalog")
            .field("root", &self.root)
            .field("scope", &self.scope)
            .field("descriptors", &self.descriptors.len())
            .finish_non_exhaustive()
    }
}

impl PackageCatalog {
    /// Create a catalog over a package source
    pub fn new(
        source: Arc<dyn PackageSource>,
        root: PathBuf,
        scope: Scope,
        overrides: BTreeMap<String, String>,
    ) -> Self {
        Self {
            source,
            root,
            scope,
            overrides,
            descriptors: DerivedCache::new(),
            aliases: DerivedCache::new(),
            externals: DerivedCache::new(),
            peers: DerivedCache::new(),
        }
    }

    /// Descriptor of a package id, with configured type overrides applied
    pub fn descriptor(&mut self, package_id: &str) -> Result<Arc<PackageDescriptor>, ConfigError> {
        let source = &self.source;
        let overrides = &self.overrides;
        self.descriptors
            .get_or_try_insert_with(&package_id.to_string(), |id| {
                let mut descriptor = source.descriptor(id)?;
                if let Some(kind) = overrides.get(id) {
                    descriptor.kind = Some(kind.clone());
                }
                Ok(Arc::new(descriptor))
            })
    }

    /// Build type of a package id
    pub fn package_type(&mut self, package_id: &str) -> Result<PackageType, ConfigError> {
        let descriptor = self.descriptor(package_id)?;
        PackageType::from_descriptor(&descriptor)
    }

    /// Path aliases of a package id
    pub fn aliases(&mut self, package_id: &str) -> Result<Arc<Vec<Alias>>, ConfigError> {
        let kind = self.package_type(package_id)?;
        let root = &self.root;
        let scope = &self.scope;
        Ok(self
            .aliases
            .get_or_insert_with(&package_id.to_string(), |id| {
                Arc::new(aliases(root, scope, id, kind))
            }))
    }

    /// Externals of a package id
    pub fn externals(&mut self, package_id: &str) -> Result<Arc<Externals>, ConfigError> {
        let descriptor = self.descriptor(package_id)?;
        let scope = &self.scope;
        Ok(self
            .externals
            .get_or_insert_with(&package_id.to_string(), |_| {
                Arc::new(externals(&descriptor, scope))
            }))
    }

    /// Peer dependencies of a vendor import specifier
    pub fn peers(&mut self, vendor: &str) -> Result<Arc<Vec<String>>, ConfigError> {
        let source = &self.source;
        self.peers
            .get_or_try_insert_with(&vendor_package_name(vendor).to_string(), |name| {
                source.peer_dependencies(name).map(Arc::new)
            })
    }
}
