use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::backend::{Backend, BlobId, Identity};
use crate::{repo, show, status, write};

/// In-process engine backed by libgit2. No CLI dependency.
///
/// The repository is reopened for every call so each query sees the index
/// as it is on disk right now.
#[derive(Debug, Clone)]
pub struct Libgit2Backend {
    root: PathBuf,
}

impl Libgit2Backend {
    /// Bind to the working directory `root`, failing if it is not a repository.
    pub fn open(root: &Path) -> Result<Self> {
        repo::open_repo(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn init(dir: &Path) -> Result<()> {
        repo::init_repo(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Backend for Libgit2Backend {
    fn head_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        status::head_entry(&self.root, rel)
    }

    fn index_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        status::index_entry(&self.root, rel)
    }

    fn worktree_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        status::worktree_entry(&self.root, rel)
    }

    fn is_ignored(&self, rel: &str) -> Result<bool> {
        status::is_ignored(&self.root, rel)
    }

    fn changed_paths(&self) -> Result<Vec<String>> {
        status::changed_paths(&self.root)
    }

    fn head_content(&self, rel: &str) -> Result<Option<Vec<u8>>> {
        show::head_content(&self.root, rel)
    }

    fn stage(&self, rel: &str) -> Result<()> {
        write::add(&self.root, rel)
    }

    fn unstage(&self, rel: &str) -> Result<()> {
        write::unstage(&self.root, rel)
    }

    fn has_head(&self) -> Result<bool> {
        let repo = repo::open_repo(&self.root)?;
        Ok(repo::head_commit(&repo)?.is_some())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        status::has_staged_changes(&self.root)
    }

    fn commit(&self, message: &str, identity: &Identity) -> Result<()> {
        let oid = write::commit(&self.root, message, identity)?;
        tracing::info!(%oid, "created commit");
        Ok(())
    }

    fn amend(&self, message: &str, identity: &Identity) -> Result<()> {
        let oid = write::amend(&self.root, message, identity)?;
        tracing::info!(%oid, "amended HEAD");
        Ok(())
    }

    fn last_commit_message(&self) -> Result<Option<String>> {
        show::last_commit_message(&self.root)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        repo::current_branch(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_requires_repository() {
        let dir = TempDir::new().unwrap();
        assert!(Libgit2Backend::open(dir.path()).is_err());

        Libgit2Backend::init(dir.path()).unwrap();
        let backend = Libgit2Backend::open(dir.path()).unwrap();
        assert_eq!(backend.root(), dir.path());
        assert!(!backend.has_head().unwrap());
    }

    #[test]
    fn test_round_trip_through_trait() {
        let dir = TempDir::new().unwrap();
        Libgit2Backend::init(dir.path()).unwrap();
        let backend: Box<dyn Backend> = Box::new(Libgit2Backend::open(dir.path()).unwrap());

        fs::write(dir.path().join("f.txt"), "1\n").unwrap();
        backend.stage("f.txt").unwrap();
        assert!(backend.has_staged_changes().unwrap());

        backend.commit("one", &Identity::default()).unwrap();
        assert!(backend.has_head().unwrap());
        assert_eq!(
            backend.head_entry("f.txt").unwrap(),
            backend.worktree_entry("f.txt").unwrap()
        );
        assert_eq!(backend.last_commit_message().unwrap().as_deref(), Some("one"));
    }
}
