//! Build command implementation
//!
//! Implements `mfe-build build`: one incremental run against the project's
//! git repository, package.json files and the configured bundler.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::output::{status, BuildProgress};
use crate::config::{ProjectConfig, RunMode};
use crate::core::orchestrator::{Orchestrator, RunOptions, RunSummary};
use crate::infra::bundler::CommandBundler;
use crate::infra::git::GitRevisions;
use crate::infra::packages::FsPackageSource;
use crate::infra::remote::RemoteBaseline;

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Run mode
    pub mode: RunMode,
    /// Number of parallel builds
    pub jobs: usize,
    /// Suppress progress output
    pub quiet: bool,
}

/// Execute the build command
pub async fn execute(project_dir: &Path, options: BuildOptions) -> Result<()> {
    let config = ProjectConfig::load(project_dir).context("Failed to load project configuration")?;
    tracing::info!(
        "Building {} in {} mode with {} job(s)",
        project_dir.display(),
        options.mode,
        options.jobs
    );

    let bundler = CommandBundler::locate(&config.build.bundler, project_dir.to_path_buf())
        .context("Failed to locate the bundler")?;
    let orchestrator = Orchestrator::new(
        bundler,
        RemoteBaseline::new(),
        Arc::new(GitRevisions::new(project_dir.to_path_buf())),
        Arc::new(FsPackageSource::new(project_dir.to_path_buf())),
    );

    let run_options = RunOptions {
        root: project_dir.to_path_buf(),
        mode: options.mode,
        jobs: options.jobs,
    };
    let progress = BuildProgress::new(options.quiet);
    let result = orchestrator.run(config, &run_options, &progress).await;
    progress.finish();
    let summary = result.context("Build failed")?;

    if !options.quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.is_noop() {
        println!("{} Up to date at {}", status::INFO, summary.revision);
        return;
    }

    println!(
        "{} Built {} module(s) and {} vendor chunk(s) at {}",
        status::SUCCESS,
        summary.local_builds.len(),
        summary.vendor_builds.len(),
        summary.revision
    );
    for module in summary.local_builds.iter().chain(&summary.vendor_builds) {
        println!("  + {module}");
    }
    for module in &summary.evicted {
        println!("  - {module}");
    }
    if !summary.html_written {
        println!("{} No HTML shell found, import map not written", status::WARNING);
    }
}
