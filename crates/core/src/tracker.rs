use std::path::{Path, PathBuf};

use scc_git::Backend;
use scc_utils::{absolutize, repo_relative};

use crate::cache::StatusCache;
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::locator::{self, RepositoryHandle};
use crate::status::{Axes, ChangedFileEntry, FileStatus, classify};

/// File-status tracker bound to the repository enclosing a path.
///
/// Status answers are memoized until [`refresh`](Self::refresh) or any
/// mutating call. The tracker is `Send + Sync`; a watcher thread may call
/// `refresh` while another thread queries.
pub struct FileStatusTracker {
    handle: RepositoryHandle,
    backend: Option<Box<dyn Backend>>,
    pub(crate) cache: StatusCache,
    config: TrackerConfig,
}

impl FileStatusTracker {
    /// Resolve the repository enclosing `path`. A path outside any
    /// repository still yields a tracker, one that only answers from disk.
    /// A `.git` the engine cannot open is passed over.
    pub fn new(path: impl AsRef<Path>, config: TrackerConfig) -> Result<Self> {
        let mut backend = None;
        let handle = locator::locate_where(path.as_ref(), |root| {
            match config.open_backend(root) {
                Ok(opened) => {
                    backend = Some(opened);
                    true
                }
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "cannot open repository");
                    false
                }
            }
        });

        tracing::debug!(
            root = %handle.working_directory.display(),
            has_repository = handle.has_repository,
            backend = ?config.backend_kind(),
            "tracker ready"
        );

        Ok(Self {
            handle,
            backend,
            cache: StatusCache::new(),
            config,
        })
    }

    /// Create a repository at `path` unless one is already there; returns
    /// its root.
    pub fn init(path: impl AsRef<Path>, config: &TrackerConfig) -> Result<PathBuf> {
        locator::init(path.as_ref(), config)
    }

    pub fn has_repository(&self) -> bool {
        self.handle.has_repository
    }

    pub fn working_directory(&self) -> &Path {
        &self.handle.working_directory
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Backend plus repo-relative path, when `abs` lies inside the repository.
    pub(crate) fn resolve(&self, abs: &Path) -> Option<(&dyn Backend, String)> {
        let backend = self.backend.as_deref()?;
        let rel = repo_relative(&self.handle.working_directory, abs)?;
        Some((backend, rel))
    }

    pub(crate) fn backend(&self) -> Option<&dyn Backend> {
        self.backend.as_deref()
    }

    /// Status of `path`, `None` when it is neither on disk nor known to git.
    ///
    /// Outside a repository the only signal is whether the file exists.
    pub fn get_status(&self, path: impl AsRef<Path>) -> Result<Option<FileStatus>> {
        let abs = absolutize(path.as_ref());
        let Some((backend, rel)) = self.resolve(&abs) else {
            return Ok(abs.is_file().then_some(FileStatus::New));
        };

        self.cache
            .get_or_insert_with(&abs, || compute_status(backend, &rel))
    }

    /// Forget every cached status.
    pub fn refresh(&self) {
        self.cache.invalidate_all();
    }

    /// Every path whose status is a change (not tracked, ignored or absent),
    /// sorted by path. Recomputed on each call.
    pub fn changed_files(&self) -> Result<Vec<ChangedFileEntry>> {
        let Some(backend) = self.backend() else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for rel in backend.changed_paths()? {
            let path = self.absolute(&rel);
            if let Some(status) = self.get_status(&path)?.filter(|s| s.is_change()) {
                entries.push(ChangedFileEntry { path, status });
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn absolute(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .fold(self.handle.working_directory.clone(), |acc, part| acc.join(part))
    }
}

fn compute_status(backend: &dyn Backend, rel: &str) -> Result<Option<FileStatus>> {
    let axes = Axes {
        worktree: backend.worktree_entry(rel)?,
        index: backend.index_entry(rel)?,
        head: backend.head_entry(rel)?,
    };

    let untracked = axes.head.is_none() && axes.index.is_none() && axes.worktree.is_some();
    let ignored = untracked && backend.is_ignored(rel)?;

    Ok(classify(&axes, ignored))
}
