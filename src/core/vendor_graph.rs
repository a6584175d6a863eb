//! Vendor dependency graph
//!
//! Relates vendor packages through their declared peer dependencies. A vendor
//! `A` with a peer dependency on `B` has `B` in its `dependencies` and is one
//! of `B`'s `dependents`. The graph is rebuilt every run from the local
//! modules' imports and is never persisted.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::core::meta::Manifest;
use crate::core::package::Scope;
use crate::error::{ConfigError, GraphError};

/// Edges of one vendor package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorInfo {
    /// Peer dependencies, in declaration order
    pub dependencies: Vec<String>,
    /// Vendors declaring this one as a peer dependency
    pub dependents: BTreeSet<String>,
}

/// Vendor names imported by any local module
pub fn referenced_vendors(manifest: &Manifest, scope: &Scope) -> BTreeSet<String> {
    manifest
        .modules
        .iter()
        .filter(|(name, _)| scope.is_local(name))
        .flat_map(|(_, record)| record.imports.keys())
        .filter(|imported| !scope.is_local(imported))
        .cloned()
        .collect()
}

/// Peer dependency graph over vendor packages
#[derive(Debug, Default)]
pub struct VendorGraph {
    nodes: BTreeMap<String, VendorInfo>,
}

impl VendorGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vendor with its peer dependencies, back-filling `dependents`
    pub fn add_vendor(&mut self, name: &str, dependencies: Vec<String>) {
        for dep in &dependencies {
            self.nodes
                .entry(dep.clone())
                .or_default()
                .dependents
                .insert(name.to_string());
        }
        self.nodes.entry(name.to_string()).or_default().dependencies = dependencies;
    }

    /// Build the graph from the vendors referenced by local modules
    ///
    /// `peers` looks up the declared peer dependencies of a vendor; it is
    /// called once per vendor. Peers are scanned in turn.
    pub fn scan<P>(manifest: &Manifest, scope: &Scope, mut peers: P) -> Result<Self, ConfigError>
    where
        P: FnMut(&str) -> Result<Vec<String>, ConfigError>,
    {
        let mut graph = Self::new();
        let mut pending: Vec<String> = referenced_vendors(manifest, scope).into_iter().collect();
        let mut scanned = HashSet::new();

        while let Some(vendor) = pending.pop() {
            if !scanned.insert(vendor.clone()) {
                continue;
            }
            let dependencies: Vec<String> = peers(&vendor)?
                .into_iter()
                .filter(|dep| !scope.is_local(dep))
                .collect();
            tracing::debug!("Vendor {vendor} peer-depends on {dependencies:?}");
            pending.extend(dependencies.iter().cloned());
            graph.add_vendor(&vendor, dependencies);
        }

        Ok(graph)
    }

    /// All vendor names
    pub fn vendors(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Whether `name` is a node
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Peer dependencies of `name`
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map_or(&[], |info| info.dependencies.as_slice())
    }

    /// Vendors declaring `name` as a peer dependency
    pub fn dependents(&self, name: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(name)
            .into_iter()
            .flat_map(|info| info.dependents.iter().map(String::as_str))
    }

    /// Group vendors into waves, dependents first
    ///
    /// Every vendor appears in a later wave than all of its dependents, so a
    /// wave can be settled once the previous waves are final.
    pub fn waves(&self) -> Result<Vec<Vec<String>>, GraphError> {
        let mut levels = HashMap::new();
        let mut in_progress = HashSet::new();
        let mut path = Vec::new();

        for name in self.nodes.keys() {
            self.level(name, &mut levels, &mut in_progress, &mut path)?;
        }

        let depth = levels.values().max().map_or(0, |deepest| deepest + 1);
        let mut waves = vec![Vec::new(); depth];
        for name in self.nodes.keys() {
            waves[levels[name]].push(name.clone());
        }
        Ok(waves)
    }

    fn level(
        &self,
        node: &str,
        levels: &mut HashMap<String, usize>,
        in_progress: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Result<usize, GraphError> {
        if let Some(&level) = levels.get(node) {
            return Ok(level);
        }

        if in_progress.contains(node) {
            // Found a cycle
            let start = path.iter().position(|n| n == node).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(node.to_string());
            return Err(GraphError::Cycle { cycle });
        }

        in_progress.insert(node.to_string());
        path.push(node.to_string());

        let mut level = 0;
        for dependent in self.dependents(node) {
            level = level.max(self.level(dependent, levels, in_progress, path)? + 1);
        }

        path.pop();
        in_progress.remove(node);
        levels.insert(node.to_string(), level);

        Ok(level)
    }
}
