use std::path::Path;

use anyhow::{Context, Result};
use git2::{Repository, Signature};

use crate::backend::Identity;

/// Open the repository whose working directory root is `root`.
pub fn open_repo(root: &Path) -> Result<Repository> {
    Repository::open(root).with_context(|| format!("no git repository at {}", root.display()))
}

/// Create an empty repository in `dir` (like `git init`).
pub fn init_repo(dir: &Path) -> Result<()> {
    Repository::init(dir)
        .with_context(|| format!("failed to initialize repository at {}", dir.display()))?;
    Ok(())
}

/// Return the name of the current branch, or `None` if HEAD is unborn or detached.
pub fn current_branch(root: &Path) -> Result<Option<String>> {
    let repo = open_repo(root)?;
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if is_unborn(&e) => return Ok(None),
        Err(e) => return Err(e).context("failed to read HEAD"),
    };

    if !head.is_branch() {
        return Ok(None);
    }
    Ok(head.shorthand().map(|s| s.to_string()))
}

/// The commit HEAD points to, `None` before the first commit.
pub(crate) fn head_commit(repo: &Repository) -> Result<Option<git2::Commit<'_>>> {
    match repo.head() {
        Ok(head) => {
            let commit = head
                .peel_to_commit()
                .context("HEAD does not point to a commit")?;
            Ok(Some(commit))
        }
        Err(e) if is_unborn(&e) => Ok(None),
        Err(e) => Err(e).context("failed to read HEAD"),
    }
}

/// Repository signature, falling back to `identity` when none is configured.
pub(crate) fn signature(repo: &Repository, identity: &Identity) -> Result<Signature<'static>> {
    repo.signature()
        .or_else(|_| Signature::now(&identity.name, &identity.email))
        .context("failed to build commit signature")
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(
        e.code(),
        git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
    )
}
