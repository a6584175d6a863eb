//! Vendor export aggregation
//!
//! A vendor chunk re-exports only the symbols its consumers import. The
//! required set of vendor `V` is the union of what local modules import from
//! `V` and what each of `V`'s dependents imports from it. Comparing that set
//! against the one derived from the manifest loaded at run start decides
//! whether `V` is rebuilt or kept. A vendor nothing references anymore is
//! evicted; one imported only for its side effects is still referenced.

use std::collections::BTreeSet;

use crate::core::bundler::{Bundler, Externals};
use crate::core::context::RunContext;
use crate::core::dispatch::{self, RunObserver};
use crate::core::meta::Manifest;
use crate::core::package::{vendor_package_name, Scope};
use crate::core::vendor_entry::render_vendor_entry;
use crate::core::vendor_graph::{referenced_vendors, VendorGraph};
use crate::error::MfeError;

/// Sorted set of symbol names
pub type SymbolSet = BTreeSet<String>;

/// Symbols `vendor` must export, according to `manifest`
pub fn required_symbols(
    vendor: &str,
    manifest: &Manifest,
    graph: &VendorGraph,
    scope: &Scope,
) -> SymbolSet {
    let mut symbols = SymbolSet::new();

    for (name, record) in &manifest.modules {
        if scope.is_local(name) {
            if let Some(imported) = record.imported_from(vendor) {
                symbols.extend(imported.iter().cloned());
            }
        }
    }

    for dependent in graph.dependents(vendor) {
        if let Some(imported) = manifest
            .modules
            .get(dependent)
            .and_then(|record| record.imported_from(vendor))
        {
            symbols.extend(imported.iter().cloned());
        }
    }

    symbols
}

/// What happens to a vendor chunk this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorAction {
    /// Rebuild re-exporting these symbols
    Build(SymbolSet),
    /// Drop the chunk, nothing references it anymore
    Evict,
    /// Leave the chunk as is
    Keep,
}

/// Decide the action for a vendor from its previous and current sets
///
/// `referenced` tells whether any local module or dependent still imports
/// the vendor, possibly with no bindings.
pub fn decide(
    previous: &SymbolSet,
    current: SymbolSet,
    referenced: bool,
    has_record: bool,
) -> VendorAction {
    if !referenced {
        return if has_record {
            VendorAction::Evict
        } else {
            VendorAction::Keep
        };
    }
    if !has_record || *previous != current {
        return VendorAction::Build(current);
    }
    VendorAction::Keep
}

/// Vendor chunks touched by a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorOutcome {
    /// Rebuilt vendors
    pub built: Vec<String>,
    /// Evicted vendors
    pub evicted: Vec<String>,
}

/// Bring every vendor chunk in line with the local modules just built
///
/// Vendors are settled in waves, dependents first, so the set a vendor is
/// judged by already includes what its rebuilt dependents import from it.
pub async fn settle_vendors<B: Bundler>(
    ctx: &mut RunContext,
    bundler: &B,
    jobs: usize,
    observer: &dyn RunObserver,
) -> Result<VendorOutcome, MfeError> {
    let catalog = &mut ctx.catalog;
    ctx.graph = VendorGraph::scan(ctx.store.manifest(), &ctx.scope, |vendor| {
        catalog.peers(vendor).map(|peers| peers.as_ref().clone())
    })?;
    let waves = ctx.graph.waves()?;
    let imported = referenced_vendors(ctx.store.manifest(), &ctx.scope);
    let mut outcome = VendorOutcome::default();

    let stale: Vec<String> = ctx
        .baseline
        .modules
        .keys()
        .filter(|name| !ctx.scope.is_local(name) && !ctx.graph.contains(name))
        .cloned()
        .collect();
    for vendor in stale {
        if ctx.store.remove(&vendor).is_some() {
            outcome.evicted.push(vendor);
        }
    }

    for wave in waves {
        let mut requests = Vec::new();

        for vendor in wave {
            let previous = required_symbols(&vendor, &ctx.baseline, &ctx.graph, &ctx.scope);
            let current = required_symbols(&vendor, ctx.store.manifest(), &ctx.graph, &ctx.scope);

            let referenced = imported.contains(&vendor) || !current.is_empty();

            match decide(&previous, current, referenced, ctx.store.contains(&vendor)) {
                VendorAction::Build(symbols) => {
                    tracing::info!(
                        "Vendor {vendor} needs [{}]",
                        symbols.iter().cloned().collect::<Vec<_>>().join(", ")
                    );
                    ctx.store.remove(&vendor);
                    let resolver = ctx.config.resolvers.get(vendor_package_name(&vendor));
                    let source = render_vendor_entry(&vendor, &symbols, resolver);
                    let externals = Externals::names(ctx.graph.dependencies(&vendor).to_vec());
                    requests.push(ctx.vendor_request(&vendor, source, externals));
                }
                VendorAction::Evict => {
                    ctx.store.remove(&vendor);
                    outcome.evicted.push(vendor);
                }
                VendorAction::Keep => tracing::debug!("Vendor {vendor} is up to date"),
            }
        }

        for (module, report) in dispatch::run_jobs(bundler, requests, jobs, observer).await? {
            dispatch::record(&mut ctx.store, &module, report)?;
            outcome.built.push(module);
        }
    }

    Ok(outcome)
}
