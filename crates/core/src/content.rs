//! Read access to committed content: file bytes at HEAD, diffs against the
//! working tree, and HEAD metadata.

use std::fs;
use std::path::Path;

use anyhow::Context;
use scc_utils::absolutize;

use crate::error::Result;
use crate::tracker::FileStatusTracker;

impl FileStatusTracker {
    /// Bytes of `path` in the last commit.
    ///
    /// `None` when the path was never committed, does not exist, or there is
    /// no repository.
    pub fn get_file_content(&self, path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
        let abs = absolutize(path.as_ref());
        let Some((backend, rel)) = self.resolve(&abs) else {
            return Ok(None);
        };
        Ok(backend.head_content(&rel)?)
    }

    /// Hunks turning the committed content of `path` into its working-tree
    /// content. A missing side counts as empty; no difference gives `""`.
    pub fn diff_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let abs = absolutize(path.as_ref());
        let committed = self.get_file_content(&abs)?.unwrap_or_default();
        let current = if abs.is_file() {
            fs::read(&abs).with_context(|| format!("failed to read {}", abs.display()))?
        } else {
            Vec::new()
        };

        let label = self
            .resolve(&abs)
            .map(|(_, rel)| rel)
            .unwrap_or_else(|| abs.display().to_string());
        Ok(scc_git::diff_buffers(&committed, &current, &label)?)
    }

    /// Full message of the last commit.
    pub fn last_commit_message(&self) -> Result<Option<String>> {
        match self.backend() {
            Some(backend) => Ok(backend.last_commit_message()?),
            None => Ok(None),
        }
    }

    /// Branch HEAD points to, `None` before the first commit or when detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.backend() {
            Some(backend) => Ok(backend.current_branch()?),
            None => Ok(None),
        }
    }
}
