//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file by writing a sibling temp file and renaming it
/// over the destination, so readers never observe a partial file.
pub async fn write_file_atomic(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FilesystemError::CreateDir {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
    }

    let temp = temp_path(path);
    tokio::fs::write(&temp, content)
        .await
        .map_err(|e| FilesystemError::WriteFile {
            path: temp.clone(),
            error: e.to_string(),
        })?;

    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(FilesystemError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
