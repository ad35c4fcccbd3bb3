use std::path::Path;

use anyhow::{Context, Result};

use crate::repo::{head_commit, open_repo};
use crate::status::head_entry;

/// Bytes of `rel` as committed in HEAD (like `git show HEAD:<rel>`).
pub fn head_content(root: &Path, rel: &str) -> Result<Option<Vec<u8>>> {
    let Some(id) = head_entry(root, rel)? else {
        return Ok(None);
    };

    let repo = open_repo(root)?;
    let oid = git2::Oid::from_str(id.as_str()).context("invalid blob id")?;
    let blob = repo
        .find_blob(oid)
        .with_context(|| format!("cannot read blob {id} for {rel}"))?;

    Ok(Some(blob.content().to_vec()))
}

/// Full message of the HEAD commit, `None` before the first commit.
pub fn last_commit_message(root: &Path) -> Result<Option<String>> {
    let repo = open_repo(root)?;
    let Some(commit) = head_commit(&repo)? else {
        return Ok(None);
    };

    Ok(Some(commit.message().unwrap_or("").to_string()))
}
