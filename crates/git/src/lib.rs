//! Version-control engines behind a single command/query surface: libgit2
//! in-process, or a `git` executable.

mod backend;
mod cli;
mod diff;
mod libgit2;
mod repo;
mod show;
mod status;
mod write;

pub use backend::{Backend, BlobId, Identity};
pub use cli::GitCliBackend;
pub use diff::{diff_buffers, BINARY_DIFFERS};
pub use libgit2::Libgit2Backend;
