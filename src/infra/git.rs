//! Git revision queries
//!
//! HEAD is read with gix. Diffs go through the `git` binary, whose rename
//! detection and `--name-status` output the change resolver understands.

use std::path::PathBuf;
use std::process::Command;

use crate::config::defaults;
use crate::core::changes::{parse_name_status, Revisions, SourceChange};
use crate::error::RevisionError;

/// Length of the abbreviated revision id recorded in the manifest
const SHORT_ID_LEN: usize = 7;

/// Revisions of the git repository at the project root
#[derive(Debug, Clone)]
pub struct GitRevisions {
    root: PathBuf,
}

impl GitRevisions {
    /// Open the repository containing `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn open(&self) -> Result<gix::Repository, RevisionError> {
        gix::discover(&self.root).map_err(|e| RevisionError::InvalidRepository {
            path: self.root.clone(),
            error: e.to_string(),
        })
    }
}

impl Revisions for GitRevisions {
    fn current(&self) -> Result<String, RevisionError> {
        let repo = self.open()?;
        let head = repo
            .head_id()
            .map_err(|e| RevisionError::ResolveHead {
                error: e.to_string(),
            })?;
        Ok(head.to_hex_with_len(SHORT_ID_LEN).to_string())
    }

    fn diff(&self, from: &str) -> Result<Vec<SourceChange>, RevisionError> {
        let output = Command::new("git")
            .args(["diff", from, "HEAD", "--name-status"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| RevisionError::Diff {
                from: from.to_string(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RevisionError::Diff {
                from: from.to_string(),
                error: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_name_status(&String::from_utf8_lossy(&output.stdout)))
    }

    fn sources(&self) -> Result<Vec<String>, RevisionError> {
        let packages = self.root.join(defaults::PACKAGES_DIR);
        if !packages.exists() {
            return Ok(Vec::new());
        }

        let mut sources = Vec::new();
        for entry in walkdir::WalkDir::new(&packages).follow_links(false) {
            let entry = entry.map_err(|e| RevisionError::Walk {
                path: packages.clone(),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let path = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                sources.push(path);
            }
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sources_are_relative_with_forward_slashes() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("packages/ui/src/button");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("index.vue"), "<template/>").unwrap();
        std::fs::write(dir.path().join("packages/ui/package.json"), "{}").unwrap();

        let mut sources = GitRevisions::new(dir.path().to_path_buf()).sources().unwrap();
        sources.sort();
        assert_eq!(
            sources,
            vec!["packages/ui/package.json", "packages/ui/src/button/index.vue"]
        );
    }

    #[test]
    fn test_sources_without_packages_dir() {
        let dir = TempDir::new().unwrap();
        assert!(GitRevisions::new(dir.path().to_path_buf())
            .sources()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_current_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        let revisions = GitRevisions::new(dir.path().join("missing"));
        assert!(matches!(
            revisions.current(),
            Err(RevisionError::InvalidRepository { .. })
        ));
    }
}
