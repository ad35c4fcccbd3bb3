use std::path::PathBuf;

use thiserror::Error;

/// Failures of tracker operations.
///
/// Queries about paths or repositories that do not exist are not errors;
/// they come back as `None`. `Backend` covers faults of the engine itself.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Repository metadata could not be created.
    #[error("cannot initialize repository at {path}: {source}")]
    Initialization {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The index cannot take the requested change.
    #[error("cannot stage {path}: {reason}")]
    Staging { path: PathBuf, reason: String },

    /// Committing with nothing staged.
    #[error("nothing staged to commit")]
    Commit,

    /// Amending before any commit exists.
    #[error("no commit to amend")]
    Amend,

    /// The engine failed while answering a query or applying a change.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
