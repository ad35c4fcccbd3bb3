//! File-status tracking over a git working directory: classify paths against
//! working tree, index and HEAD, and stage, unstage, commit or amend through
//! a pluggable engine.

mod cache;
pub mod config;
mod content;
mod error;
pub mod locator;
mod mutation;
pub mod status;
mod tracker;

pub use cache::StatusCache;
pub use config::{BackendKind, TrackerConfig};
pub use error::{Result, TrackerError};
pub use locator::RepositoryHandle;
pub use status::{ChangedFileEntry, FileStatus};
pub use tracker::FileStatusTracker;

pub use scc_git::Identity;
