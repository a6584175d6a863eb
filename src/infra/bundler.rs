//! External bundler process
//!
//! Runs the configured bundler command once per build. The request is written
//! to the process as JSON on stdin and the report is read as JSON from stdout.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::bundler::{BuildRequest, BundleReport, Bundler};
use crate::error::BundlerError;

/// Bundler driven through a child process
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
}

impl CommandBundler {
    /// Resolve the bundler command on PATH
    ///
    /// `command` is the program followed by its arguments; builds run with
    /// `cwd` as working directory.
    pub fn locate(command: &[String], cwd: PathBuf) -> Result<Self, BundlerError> {
        let Some((program, args)) = command.split_first() else {
            return Err(BundlerError::NotFound {
                program: String::new(),
            });
        };
        let program = which::which(program).map_err(|_| BundlerError::NotFound {
            program: program.clone(),
        })?;
        tracing::debug!("Using bundler {}", program.display());

        Ok(Self {
            program,
            args: args.to_vec(),
            cwd,
        })
    }

    async fn run(&self, request: BuildRequest) -> Result<BundleReport, BundlerError> {
        let module = request.module.clone();
        let spawn_error = |error: std::io::Error| BundlerError::Spawn {
            module: module.clone(),
            error: error.to_string(),
        };

        let payload = serde_json::to_vec(&request).map_err(|e| BundlerError::Spawn {
            module: module.clone(),
            error: e.to_string(),
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await.map_err(spawn_error)?;
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if !output.status.success() {
            return Err(BundlerError::Failed {
                module,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| BundlerError::InvalidReport {
            module,
            error: e.to_string(),
        })
    }
}

impl Bundler for CommandBundler {
    fn build(
        &self,
        request: BuildRequest,
    ) -> impl Future<Output = Result<BundleReport, BundlerError>> + Send {
        self.run(request)
    }
}
