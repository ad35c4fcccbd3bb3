use std::fs;
use std::path::{Path, PathBuf};

use scc_utils::{absolutize, is_repo_root};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};

/// Where a tracker's paths are resolved, and whether a repository lives there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    pub working_directory: PathBuf,
    pub has_repository: bool,
}

/// Walk upward from `path` to the nearest directory holding `.git`.
///
/// Without a repository the handle points at `path` itself.
pub fn locate(path: &Path) -> RepositoryHandle {
    locate_where(path, |_| true)
}

/// Like [`locate`], but a directory holding `.git` only counts when
/// `accept` agrees; otherwise the walk goes on upward.
pub fn locate_where(path: &Path, mut accept: impl FnMut(&Path) -> bool) -> RepositoryHandle {
    let start = absolutize(path);

    for dir in start.ancestors() {
        if !is_repo_root(dir) {
            continue;
        }
        if accept(dir) {
            tracing::debug!(root = %dir.display(), "found repository");
            return RepositoryHandle {
                working_directory: dir.to_path_buf(),
                has_repository: true,
            };
        }
        tracing::debug!(dir = %dir.display(), "skipping unusable .git");
    }

    tracing::debug!(path = %start.display(), "no repository above path");
    RepositoryHandle {
        working_directory: start,
        has_repository: false,
    }
}

/// Create a repository at `path`, creating the directory if needed. An
/// existing file selects its parent directory. Returns the repository root.
///
/// A directory that already holds a usable repository is left untouched.
pub fn init(path: &Path, config: &TrackerConfig) -> Result<PathBuf> {
    let target = absolutize(path);
    let root = if target.is_file() {
        target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target.clone())
    } else {
        target
    };

    if is_repo_root(&root) && config.open_backend(&root).is_ok() {
        return Ok(root);
    }

    fs::create_dir_all(&root).map_err(|e| TrackerError::Initialization {
        path: root.clone(),
        source: e.into(),
    })?;
    config
        .init_repository(&root)
        .map_err(|source| TrackerError::Initialization {
            path: root.clone(),
            source,
        })?;

    tracing::info!(root = %root.display(), "initialized repository");
    Ok(root)
}
