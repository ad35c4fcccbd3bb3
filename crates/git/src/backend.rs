use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Content hash of a blob as reported by the engine (hex object id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<git2::Oid> for BlobId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author/committer used when the repository has no `user.name`/`user.email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "scc".to_string(),
            email: "scc@localhost".to_string(),
        }
    }
}

/// Command/query surface of a version-control engine bound to one working
/// directory.
///
/// Every `rel` argument is a `/`-separated path relative to the working
/// directory root. Queries about a path the engine does not know return
/// `Ok(None)`; `Err` is reserved for engine faults.
pub trait Backend: Send + Sync {
    /// Blob id of `rel` in the tree of HEAD.
    fn head_entry(&self, rel: &str) -> Result<Option<BlobId>>;

    /// Blob id of `rel` in the index (stage 0).
    fn index_entry(&self, rel: &str) -> Result<Option<BlobId>>;

    /// Blob id the working-tree file would hash to, `None` if it is missing.
    fn worktree_entry(&self, rel: &str) -> Result<Option<BlobId>>;

    /// Whether ignore rules match `rel`.
    fn is_ignored(&self, rel: &str) -> Result<bool>;

    /// Every path that differs on any of the HEAD / index / working-tree
    /// axes, untracked files included, ignored files excluded.
    fn changed_paths(&self) -> Result<Vec<String>>;

    /// Bytes of `rel` at HEAD.
    fn head_content(&self, rel: &str) -> Result<Option<Vec<u8>>>;

    /// Record the working-tree state of `rel` (content or deletion) in the index.
    fn stage(&self, rel: &str) -> Result<()>;

    /// Reset the index entry of `rel` to HEAD, or drop it when HEAD lacks it.
    fn unstage(&self, rel: &str) -> Result<()>;

    /// Whether HEAD points at a commit.
    fn has_head(&self) -> Result<bool>;

    /// Whether the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool>;

    /// Commit the index on top of HEAD.
    fn commit(&self, message: &str, identity: &Identity) -> Result<()>;

    /// Replace HEAD with a commit of the current index under `message`.
    fn amend(&self, message: &str, identity: &Identity) -> Result<()>;

    /// Full message of HEAD.
    fn last_commit_message(&self) -> Result<Option<String>>;

    /// Short name of the branch HEAD points to.
    fn current_branch(&self) -> Result<Option<String>>;
}
