//! Build dispatch
//!
//! Routes every changed source path to a build unit:
//!
//! - `pages`: each changed page is built on its own
//! - `components` / `utils`: one build of the package main entry per run
//! - `container`: as above, with the container build strategy
//!
//! Changed paths that replace or remove a previous output evict the old
//! module first, as does any build of a module that already has a record.
//! Build units are independent and run concurrently.

use futures::{stream, StreamExt, TryStreamExt};

use crate::core::bundler::{BuildRequest, BuildStrategy, BundleReport, Bundler};
use crate::core::changes::{ChangeStatus, SourceChange};
use crate::core::context::RunContext;
use crate::core::meta::MetaStore;
use crate::core::package::{local_module_name, main_entry, package_id, PackageType};
use crate::error::{BundlerError, ConfigError};

/// Progress notifications during a run
pub trait RunObserver: Sync {
    /// Number of builds about to start
    fn builds_started(&self, _count: usize) {}

    /// A module finished building
    fn module_built(&self, _module: &str) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl RunObserver for Silent {}

/// Evictions and builds derived from a change set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchPlan {
    /// Modules to evict before building, in order
    pub evictions: Vec<String>,
    /// Builds to run
    pub builds: Vec<BuildRequest>,
}

impl DispatchPlan {
    fn evict(&mut self, module: String) {
        if !self.evictions.contains(&module) {
            self.evictions.push(module);
        }
    }

    /// Check if the plan does nothing
    pub fn is_empty(&self) -> bool {
        self.evictions.is_empty() && self.builds.is_empty()
    }
}

/// Turn a change set into a dispatch plan
///
/// Shared packages are deduplicated through the context's built set, and the
/// container's name is remembered on the context.
pub fn plan(ctx: &mut RunContext, changes: &[SourceChange]) -> Result<DispatchPlan, ConfigError> {
    let mut plan = DispatchPlan::default();

    for change in changes {
        let id = package_id(&change.path).ok_or_else(|| ConfigError::NotAPackagePath {
            path: change.path.clone(),
        })?;

        let descriptor = match ctx.catalog.descriptor(id) {
            Ok(descriptor) => descriptor,
            Err(e) if change.status == ChangeStatus::Deleted => {
                tracing::warn!("Package '{id}' was removed ({e}), evicting its modules");
                evict_package(ctx, &mut plan, id);
                continue;
            }
            Err(e) => return Err(e),
        };
        if !ctx.scope.is_local(&descriptor.name) {
            return Err(ConfigError::OutsideScope {
                package: id.to_string(),
                name: descriptor.name.clone(),
                scope: ctx.scope.as_str().to_string(),
            });
        }
        let kind = PackageType::from_descriptor(&descriptor)?;
        let module = local_module_name(&change.path, &descriptor, kind);

        if change.status.evicts() || ctx.store.contains(&module) {
            plan.evict(module.clone());
        }

        let (strategy, entry) = match kind {
            PackageType::Pages => {
                if change.status == ChangeStatus::Deleted {
                    continue;
                }
                (BuildStrategy::Library, change.path.clone())
            }
            PackageType::Components | PackageType::Utils | PackageType::Container => {
                if kind == PackageType::Container {
                    ctx.container = Some(descriptor.name.clone());
                }
                if !ctx.built.insert(descriptor.name.clone()) {
                    continue;
                }
                let strategy = if kind == PackageType::Container {
                    BuildStrategy::Container
                } else {
                    BuildStrategy::Library
                };
                (strategy, main_entry(&descriptor))
            }
        };

        let aliases = ctx.catalog.aliases(id)?.as_ref().clone();
        let externals = ctx.catalog.externals(id)?.as_ref().clone();
        tracing::debug!("Dispatching {module} ({kind}) from {entry}");
        plan.builds
            .push(ctx.local_request(module, strategy, entry, aliases, externals));
    }

    Ok(plan)
}

/// Evict every module of a package whose descriptor no longer exists
fn evict_package(ctx: &RunContext, plan: &mut DispatchPlan, package_id: &str) {
    let name = ctx.scope.conventional_name(package_id);
    let nested = format!("{name}/");
    let modules: Vec<String> = ctx
        .store
        .names()
        .filter(|module| *module == name || module.starts_with(&nested))
        .map(ToString::to_string)
        .collect();
    for module in modules {
        plan.evict(module);
    }
}

/// Run builds concurrently, at most `jobs` at a time
///
/// The first failure aborts the remaining builds. Reports are returned
/// sorted by module name.
pub async fn run_jobs<B: Bundler>(
    bundler: &B,
    requests: Vec<BuildRequest>,
    jobs: usize,
    observer: &dyn RunObserver,
) -> Result<Vec<(String, BundleReport)>, BundlerError> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    observer.builds_started(requests.len());

    let mut reports: Vec<(String, BundleReport)> = stream::iter(requests)
        .map(|request| async move {
            let module = request.module.clone();
            tracing::info!("Building {module}");
            let report = bundler.build(request).await?;
            observer.module_built(&module);
            Ok::<_, BundlerError>((module, report))
        })
        .buffer_unordered(jobs.max(1))
        .try_collect()
        .await?;

    reports.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(reports)
}

/// Record a finished build into the store
pub fn record(store: &mut MetaStore, module: &str, report: BundleReport) -> Result<(), BundlerError> {
    let built = report.into_record(module)?;
    tracing::debug!("Recorded {module} -> {}", built.js);
    *store.get(module) = built;
    Ok(())
}

/// Apply a dispatch plan: evict, build, record
///
/// Returns the names of the built modules.
pub async fn execute<B: Bundler>(
    ctx: &mut RunContext,
    plan: DispatchPlan,
    bundler: &B,
    jobs: usize,
    observer: &dyn RunObserver,
) -> Result<Vec<String>, BundlerError> {
    for module in &plan.evictions {
        ctx.store.remove(module);
    }

    let reports = run_jobs(bundler, plan.builds, jobs, observer).await?;
    let mut built = Vec::with_capacity(reports.len());
    for (module, report) in reports {
        record(&mut ctx.store, &module, report)?;
        built.push(module);
    }
    Ok(built)
}
