//! Run orchestration
//!
//! One run goes through these phases in order:
//!
//! 1. load the baseline manifest and resolve the change set
//! 2. plan and execute the local builds
//! 3. settle the vendor chunks against the new local imports
//! 4. assemble the HTML shell, then persist manifest and HTML
//!
//! Any failure before the last phase leaves the artifact directory's
//! manifest untouched, so the next run diffs from the same baseline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{defaults, ProjectConfig, RunMode};
use crate::core::baseline::{self, Baseline};
use crate::core::bundler::Bundler;
use crate::core::changes::{self, ChangeSet, Revisions};
use crate::core::context::RunContext;
use crate::core::dispatch::{self, DispatchPlan, RunObserver};
use crate::core::exports;
use crate::core::importmap;
use crate::core::package::PackageSource;
use crate::error::MfeError;
use crate::infra::filesystem;

/// Per-invocation options
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project root
    pub root: PathBuf,
    /// Run mode
    pub mode: RunMode,
    /// Maximum concurrent builds
    pub jobs: usize,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Revision the artifacts now reflect
    pub revision: String,
    /// Number of changed source paths
    pub changes: usize,
    /// Local modules built
    pub local_builds: Vec<String>,
    /// Vendor chunks built
    pub vendor_builds: Vec<String>,
    /// Modules evicted and not rebuilt
    pub evicted: Vec<String>,
    /// Whether the HTML shell was rewritten
    pub html_written: bool,
}

impl RunSummary {
    /// Whether the run found nothing to do
    pub fn is_noop(&self) -> bool {
        self.changes == 0
    }
}

/// Change set and dispatch plan of a run, computed without building
#[derive(Debug)]
pub struct RunPlan {
    /// Resolved change set
    pub changes: ChangeSet,
    /// Baseline revision the changes were diffed against
    pub baseline: Option<String>,
    /// Local evictions and builds
    pub dispatch: DispatchPlan,
}

/// Drives runs against a set of collaborators
pub struct Orchestrator<B, F> {
    bundler: B,
    fetcher: F,
    revisions: Arc<dyn Revisions>,
    packages: Arc<dyn PackageSource>,
}

impl<B: Bundler + Sync, F: Baseline + Sync> Orchestrator<B, F> {
    /// Create an orchestrator
    pub fn new(
        bundler: B,
        fetcher: F,
        revisions: Arc<dyn Revisions>,
        packages: Arc<dyn PackageSource>,
    ) -> Self {
        Self {
            bundler,
            fetcher,
            revisions,
            packages,
        }
    }

    /// Bundler used by this orchestrator
    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    /// Load the baseline and resolve the change set
    async fn prepare(
        &self,
        config: ProjectConfig,
        options: &RunOptions,
    ) -> Result<(RunContext, ChangeSet), MfeError> {
        let manifest =
            baseline::load_manifest(&self.fetcher, &config, options.mode, &options.root).await?;
        let changes = changes::resolve(self.revisions.as_ref(), manifest.hash.as_deref())?;
        tracing::info!(
            "{} changed source path(s) at revision {}",
            changes.changes.len(),
            changes.revision
        );

        let ctx = RunContext::new(
            &options.root,
            config,
            options.mode,
            manifest,
            Arc::clone(&self.packages),
        );
        Ok((ctx, changes))
    }

    /// Resolve what a run would do, without building or writing
    pub async fn plan(&self, config: ProjectConfig, options: &RunOptions) -> Result<RunPlan, MfeError> {
        let (mut ctx, changes) = self.prepare(config, options).await?;
        let dispatch = dispatch::plan(&mut ctx, &changes.changes)?;
        Ok(RunPlan {
            baseline: ctx.baseline.hash.clone(),
            changes,
            dispatch,
        })
    }

    /// Perform one incremental build
    pub async fn run(
        &self,
        config: ProjectConfig,
        options: &RunOptions,
        observer: &dyn RunObserver,
    ) -> Result<RunSummary, MfeError> {
        let (mut ctx, changes) = self.prepare(config, options).await?;
        let mut summary = RunSummary {
            revision: changes.revision.clone(),
            changes: changes.changes.len(),
            ..Default::default()
        };
        if changes.is_empty() {
            tracing::info!("No package sources changed, nothing to build");
            return Ok(summary);
        }

        let plan = dispatch::plan(&mut ctx, &changes.changes)?;
        summary.evicted = plan
            .evictions
            .iter()
            .filter(|module| ctx.store.contains(module))
            .cloned()
            .collect();
        summary.local_builds =
            dispatch::execute(&mut ctx, plan, &self.bundler, options.jobs, observer).await?;
        summary
            .evicted
            .retain(|module| !summary.local_builds.contains(module));

        let vendors = exports::settle_vendors(&mut ctx, &self.bundler, options.jobs, observer).await?;
        summary.vendor_builds = vendors.built;
        summary.evicted.extend(vendors.evicted);

        let container_rebuilt = ctx.container_rebuilt();
        let html = baseline::load_html(
            &self.fetcher,
            &ctx.config,
            ctx.mode,
            &ctx.root,
            container_rebuilt,
        )
        .await?
        .map(|shell| importmap::assemble(&shell, ctx.store.manifest(), container_rebuilt))
        .transpose()?;

        ctx.store.set_revision(&changes.revision);
        let html_path = ctx.dist().join(defaults::HTML_FILE);
        let write_html = async {
            if let Some(html) = &html {
                filesystem::write_file_atomic(&html_path, html).await?;
            }
            Ok::<_, MfeError>(())
        };
        tokio::try_join!(ctx.store.persist(), write_html)?;
        summary.html_written = html.is_some();

        tracing::info!(
            "Built {} local module(s) and {} vendor chunk(s), evicted {}",
            summary.local_builds.len(),
            summary.vendor_builds.len(),
            summary.evicted.len()
        );
        Ok(summary)
    }
}
