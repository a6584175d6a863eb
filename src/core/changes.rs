//! Change set resolution
//!
//! Determines which package source files changed between the revision the
//! manifest reflects and the working revision. Without a prior revision every
//! package source file counts as added.

use std::fmt;

use crate::config::defaults;
use crate::core::package::is_package_source;
use crate::error::RevisionError;

/// How a path changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    /// New file
    Added,
    /// Existing file with new content
    Modified,
    /// File removed or renamed away
    Deleted,
}

impl ChangeStatus {
    /// Whether the previously emitted module must be evicted first
    pub fn evicts(self) -> bool {
        !matches!(self, Self::Added)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "A"),
            Self::Modified => write!(f, "M"),
            Self::Deleted => write!(f, "D"),
        }
    }
}

/// One changed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChange {
    /// Change status
    pub status: ChangeStatus,
    /// Project-relative path with forward slashes
    pub path: String,
}

impl SourceChange {
    /// Create a change entry
    pub fn new(status: ChangeStatus, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }
}

/// Resolved change set of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Changed package sources
    pub changes: Vec<SourceChange>,
    /// Working revision the run builds
    pub revision: String,
}

impl ChangeSet {
    /// Whether nothing needs to be built
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Revision control queries
pub trait Revisions: Send + Sync {
    /// Identifier of the working revision
    fn current(&self) -> Result<String, RevisionError>;

    /// Paths changed between `from` and the working revision
    fn diff(&self, from: &str) -> Result<Vec<SourceChange>, RevisionError>;

    /// Every file under `packages/*/src`, project-relative
    fn sources(&self) -> Result<Vec<String>, RevisionError>;
}

/// Parse `git diff --name-status` output
///
/// Renames are split into a deletion of the old path and an addition of the
/// new one; copies only add the new path.
pub fn parse_name_status(output: &str) -> Vec<SourceChange> {
    let mut changes = Vec::new();
    for line in output.lines() {
        let mut fields = line.split('\t');
        let (Some(status), Some(path)) = (fields.next(), fields.next()) else {
            continue;
        };
        let target = fields.next();
        match status.chars().next() {
            Some('A') => changes.push(SourceChange::new(ChangeStatus::Added, path)),
            Some('M' | 'T') => changes.push(SourceChange::new(ChangeStatus::Modified, path)),
            Some('D') => changes.push(SourceChange::new(ChangeStatus::Deleted, path)),
            Some('R') => {
                changes.push(SourceChange::new(ChangeStatus::Deleted, path));
                if let Some(new_path) = target {
                    changes.push(SourceChange::new(ChangeStatus::Added, new_path));
                }
            }
            Some('C') => {
                if let Some(new_path) = target {
                    changes.push(SourceChange::new(ChangeStatus::Added, new_path));
                }
            }
            _ => tracing::debug!("Skipping unrecognized diff line: {line}"),
        }
    }
    changes
}

fn has_source_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| defaults::SOURCE_EXTENSIONS.contains(&ext))
}

/// Resolve the change set for a run
///
/// With a prior revision the diff is restricted to package sources; without
/// one every `.ts`, `.tsx` and `.vue` package source is added.
pub fn resolve(revisions: &dyn Revisions, prior: Option<&str>) -> Result<ChangeSet, RevisionError> {
    let revision = revisions.current()?;

    let changes = match prior {
        Some(prior) => {
            tracing::info!("Diffing {prior}..{revision}");
            revisions
                .diff(prior)?
                .into_iter()
                .filter(|c| is_package_source(&c.path))
                .collect()
        }
        None => {
            tracing::info!("No prior revision, treating every package source as added");
            let mut sources: Vec<String> = revisions
                .sources()?
                .into_iter()
                .filter(|p| is_package_source(p) && has_source_extension(p))
                .collect();
            sources.sort();
            sources
                .into_iter()
                .map(|path| SourceChange::new(ChangeStatus::Added, path))
                .collect()
        }
    };

    Ok(ChangeSet { changes, revision })
}
