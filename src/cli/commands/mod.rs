//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod plan;

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use crate::config::RunMode;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the packages changed since the last build
    Build {
        /// Run mode: local, staged (qa) or production (prod)
        #[arg(short, long, env = "MFE_MODE", value_parser = parse_mode)]
        mode: Option<RunMode>,

        /// Number of parallel builds (defaults to the CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show what a build would do without building
    Plan {
        /// Run mode: local, staged (qa) or production (prod)
        #[arg(short, long, env = "MFE_MODE", value_parser = parse_mode)]
        mode: Option<RunMode>,
    },
}

fn parse_mode(value: &str) -> Result<RunMode, String> {
    value.parse().map_err(|e: crate::error::ConfigError| e.to_string())
}

impl Commands {
    /// Execute the command
    pub async fn run(self, root: &Path, quiet: bool) -> Result<()> {
        match self {
            Self::Build { mode, jobs } => {
                let options = build::BuildOptions {
                    mode: mode.unwrap_or_default(),
                    jobs: jobs.unwrap_or_else(num_cpus::get),
                    quiet,
                };
                build::execute(root, options).await
            }
            Self::Plan { mode } => plan::execute(root, mode.unwrap_or_default()).await,
        }
    }
}
