//! Plan command implementation
//!
//! Implements `mfe-build plan`: resolves the change set and the local builds
//! it triggers without running the bundler or writing anything.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::output::status;
use crate::config::{ProjectConfig, RunMode};
use crate::core::bundler::{BuildRequest, BundleReport, Bundler, Entry};
use crate::core::orchestrator::{Orchestrator, RunOptions, RunPlan};
use crate::error::BundlerError;
use crate::infra::git::GitRevisions;
use crate::infra::packages::FsPackageSource;
use crate::infra::remote::RemoteBaseline;

/// Stand-in bundler for planning; it is never invoked
struct NoBundler;

impl Bundler for NoBundler {
    async fn build(&self, request: BuildRequest) -> Result<BundleReport, BundlerError> {
        Err(BundlerError::Spawn {
            module: request.module,
            error: "planning does not build".to_string(),
        })
    }
}

/// Execute the plan command
pub async fn execute(project_dir: &Path, mode: RunMode) -> Result<()> {
    let config = ProjectConfig::load(project_dir).context("Failed to load project configuration")?;
    let orchestrator = Orchestrator::new(
        NoBundler,
        RemoteBaseline::new(),
        Arc::new(GitRevisions::new(project_dir.to_path_buf())),
        Arc::new(FsPackageSource::new(project_dir.to_path_buf())),
    );
    let options = RunOptions {
        root: project_dir.to_path_buf(),
        mode,
        jobs: 1,
    };

    let plan = orchestrator
        .plan(config, &options)
        .await
        .context("Failed to plan build")?;
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &RunPlan) {
    println!(
        "{} {} -> {}: {} changed path(s)",
        status::INFO,
        plan.baseline.as_deref().unwrap_or("(none)"),
        plan.changes.revision,
        plan.changes.changes.len()
    );
    for change in &plan.changes.changes {
        println!("  {} {}", change.status, change.path);
    }
    if plan.dispatch.is_empty() {
        println!("{} Nothing to build", status::SUCCESS);
        return;
    }

    for module in &plan.dispatch.evictions {
        println!("  evict {module}");
    }
    for build in &plan.dispatch.builds {
        let entry = match &build.entry {
            Entry::File { path } => path.as_str(),
            Entry::Virtual { id, .. } => id.as_str(),
        };
        println!("  build {} ({:?}) from {entry}", build.module, build.strategy);
    }
    println!("{} Vendor chunks are settled after the local builds", status::INFO);
}
