use std::path::Path;

use anyhow::{Context, Result};
use git2::{ObjectType, Oid, StatusOptions};

use crate::backend::BlobId;
use crate::repo::{head_commit, open_repo};

/// Blob id of `rel` in the tree of HEAD (like `git ls-tree HEAD -- <rel>`).
pub fn head_entry(root: &Path, rel: &str) -> Result<Option<BlobId>> {
    let repo = open_repo(root)?;
    let Some(commit) = head_commit(&repo)? else {
        return Ok(None);
    };
    let tree = commit.tree().context("HEAD commit has no tree")?;

    match tree.get_path(Path::new(rel)) {
        Ok(entry) if entry.kind() == Some(ObjectType::Blob) => Ok(Some(entry.id().into())),
        Ok(_) => Ok(None),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to look up {rel} in HEAD")),
    }
}

/// Blob id of `rel` in the index (like `git ls-files -s -- <rel>`).
pub fn index_entry(root: &Path, rel: &str) -> Result<Option<BlobId>> {
    let repo = open_repo(root)?;
    let index = repo.index().context("failed to read index")?;
    Ok(index.get_path(Path::new(rel), 0).map(|entry| entry.id.into()))
}

/// Blob id the working-tree file would get if staged now (like
/// `git hash-object <rel>`, clean filters such as `eol` and `autocrlf`
/// included).
pub fn worktree_entry(root: &Path, rel: &str) -> Result<Option<BlobId>> {
    let full = root.join(rel);
    if !full.is_file() {
        return Ok(None);
    }

    let raw = Oid::hash_file(ObjectType::Blob, &full)
        .with_context(|| format!("failed to hash {}", full.display()))?;
    let repo = open_repo(root)?;
    let index = repo.index().context("failed to read index")?;
    let Some(staged) = index.get_path(Path::new(rel), 0).map(|entry| entry.id) else {
        return Ok(Some(raw.into()));
    };

    // status_file compares filtered content against the index entry.
    let status = repo
        .status_file(Path::new(rel))
        .with_context(|| format!("failed to read status of {rel}"))?;
    if !status.intersects(git2::Status::WT_MODIFIED | git2::Status::WT_TYPECHANGE) {
        return Ok(Some(staged.into()));
    }
    if raw != staged {
        return Ok(Some(raw.into()));
    }

    // Raw bytes match the index but the filtered content does not.
    let filtered = repo
        .blob_path(&full)
        .with_context(|| format!("failed to hash {} through filters", full.display()))?;
    Ok(Some(filtered.into()))
}

/// Whether `rel` is matched by the repository's ignore rules.
pub fn is_ignored(root: &Path, rel: &str) -> Result<bool> {
    let repo = open_repo(root)?;
    repo.is_path_ignored(Path::new(rel))
        .with_context(|| format!("failed to check ignore rules for {rel}"))
}

/// Paths whose HEAD, index or working-tree state differ
/// (like `git status --porcelain --untracked-files=all --no-renames`).
pub fn changed_paths(root: &Path) -> Result<Vec<String>> {
    let repo = open_repo(root)?;

    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo
        .statuses(Some(&mut opts))
        .context("failed to compute repository status")?;

    let mut paths = Vec::with_capacity(statuses.len());
    for entry in statuses.iter() {
        let s = entry.status();
        if s.is_empty() || s.contains(git2::Status::IGNORED) {
            continue;
        }
        if let Some(path) = entry.path() {
            paths.push(path.to_string());
        }
    }

    Ok(paths)
}

/// Whether the index tree differs from the tree of HEAD.
pub fn has_staged_changes(root: &Path) -> Result<bool> {
    let repo = open_repo(root)?;
    let mut index = repo.index().context("failed to read index")?;

    match head_commit(&repo)? {
        Some(commit) => {
            let index_tree = index.write_tree().context("failed to write index tree")?;
            Ok(index_tree != commit.tree_id())
        }
        None => Ok(!index.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo_with_file() -> (TempDir, git2::Repository) {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();

        fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("hello.txt")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }

        (dir, repo)
    }

    #[test]
    fn test_clean_entries_agree() {
        let (dir, _) = init_repo_with_file();
        let head = head_entry(dir.path(), "hello.txt").unwrap();
        let index = index_entry(dir.path(), "hello.txt").unwrap();
        let worktree = worktree_entry(dir.path(), "hello.txt").unwrap();

        assert!(head.is_some());
        assert_eq!(head, index);
        assert_eq!(index, worktree);
        assert!(changed_paths(dir.path()).unwrap().is_empty());
        assert!(!has_staged_changes(dir.path()).unwrap());
    }

    #[test]
    fn test_missing_paths_are_none() {
        let (dir, _) = init_repo_with_file();
        assert_eq!(head_entry(dir.path(), "nope.txt").unwrap(), None);
        assert_eq!(index_entry(dir.path(), "nope.txt").unwrap(), None);
        assert_eq!(worktree_entry(dir.path(), "nope.txt").unwrap(), None);
        assert_eq!(head_entry(dir.path(), "a/b/c.txt").unwrap(), None);
    }

    #[test]
    fn test_unborn_head() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("new.txt"), "x").unwrap();

        assert_eq!(head_entry(dir.path(), "new.txt").unwrap(), None);
        assert!(!has_staged_changes(dir.path()).unwrap());
        assert_eq!(changed_paths(dir.path()).unwrap(), vec!["new.txt"]);
    }

    #[test]
    fn test_modified_worktree() {
        let (dir, _) = init_repo_with_file();
        fs::write(dir.path().join("hello.txt"), "changed\n").unwrap();

        let head = head_entry(dir.path(), "hello.txt").unwrap();
        let worktree = worktree_entry(dir.path(), "hello.txt").unwrap();
        assert_ne!(head, worktree);
        assert_eq!(changed_paths(dir.path()).unwrap(), vec!["hello.txt"]);
        assert!(!has_staged_changes(dir.path()).unwrap());
    }

    #[test]
    fn test_worktree_entry_applies_eol_filter() {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join(".gitattributes"), "* text eol=lf\n").unwrap();
        fs::write(dir.path().join("crlf.txt"), "a\r\nb\r\n").unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new(".gitattributes")).unwrap();
            index.add_path(Path::new("crlf.txt")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "crlf", &tree, &[])
                .unwrap();
        }

        let head = head_entry(dir.path(), "crlf.txt").unwrap();
        assert_eq!(worktree_entry(dir.path(), "crlf.txt").unwrap(), head);
        assert!(changed_paths(dir.path()).unwrap().is_empty());

        fs::write(dir.path().join("crlf.txt"), "a\r\nbc\r\n").unwrap();
        assert_ne!(worktree_entry(dir.path(), "crlf.txt").unwrap(), head);
    }

    #[test]
    fn test_nested_untracked_and_ignored() {
        let (dir, _) = init_repo_with_file();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::create_dir_all(dir.path().join("sub dir/中文")).unwrap();
        fs::write(dir.path().join("sub dir/中文/a.txt"), "a").unwrap();
        fs::write(dir.path().join("debug.log"), "noise").unwrap();

        let mut paths = changed_paths(dir.path()).unwrap();
        paths.sort();
        assert_eq!(paths, vec![".gitignore", "sub dir/中文/a.txt"]);
        assert!(is_ignored(dir.path(), "debug.log").unwrap());
        assert!(!is_ignored(dir.path(), "sub dir/中文/a.txt").unwrap());
    }
}
