//! Index and history changes. Each call runs inside the status cache's
//! critical section and leaves the cache empty behind it.

use std::path::Path;

use scc_utils::absolutize;

use crate::error::{Result, TrackerError};
use crate::tracker::FileStatusTracker;

impl FileStatusTracker {
    /// Stage the working-tree state of `path`: its content, or its deletion
    /// when the file is gone. Staging an already-staged deletion is a no-op.
    pub fn stage_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let abs = absolutize(path.as_ref());
        let Some((backend, rel)) = self.resolve(&abs) else {
            return Err(TrackerError::Staging {
                path: abs,
                reason: "not inside a repository".to_string(),
            });
        };

        self.cache.invalidate_after(|| -> Result<()> {
            if abs.is_file() || backend.index_entry(&rel)?.is_some() {
                backend.stage(&rel)?;
                return Ok(());
            }
            if backend.head_entry(&rel)?.is_some() {
                return Ok(());
            }
            Err(TrackerError::Staging {
                path: abs.clone(),
                reason: "no such file in the working tree or index".to_string(),
            })
        })
    }

    /// Put the index entry of `path` back to what HEAD has (dropping it when
    /// HEAD has none). No-op when nothing is staged for the path.
    pub fn unstage_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let abs = absolutize(path.as_ref());
        let Some((backend, rel)) = self.resolve(&abs) else {
            return Ok(());
        };

        self.cache.invalidate_after(|| -> Result<()> {
            if backend.index_entry(&rel)? == backend.head_entry(&rel)? {
                return Ok(());
            }
            backend.unstage(&rel)?;
            Ok(())
        })
    }

    /// Commit whatever is staged. Fails with [`TrackerError::Commit`] when
    /// the index matches HEAD.
    pub fn commit(&self, message: &str) -> Result<()> {
        let Some(backend) = self.backend() else {
            return Err(TrackerError::Commit);
        };
        let identity = self.config().identity();

        self.cache.invalidate_after(|| -> Result<()> {
            if !backend.has_staged_changes()? {
                return Err(TrackerError::Commit);
            }
            backend.commit(message, &identity)?;
            Ok(())
        })
    }

    /// Replace the last commit with one holding its tree plus the staged
    /// changes, under `message`. Fails with [`TrackerError::Amend`] before
    /// the first commit.
    pub fn amend_commit(&self, message: &str) -> Result<()> {
        let Some(backend) = self.backend() else {
            return Err(TrackerError::Amend);
        };
        let identity = self.config().identity();

        self.cache.invalidate_after(|| -> Result<()> {
            if !backend.has_head()? {
                return Err(TrackerError::Amend);
            }
            backend.amend(message, &identity)?;
            Ok(())
        })
    }
}
