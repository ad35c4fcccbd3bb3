//! Write operations: add, unstage, commit, amend.

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::backend::Identity;
use crate::repo::{head_commit, open_repo, signature};

/// Stage the working-tree state of `rel` (like `git add -A -- <rel>`).
///
/// A missing file stages its deletion.
pub fn add(root: &Path, rel: &str) -> Result<()> {
    let repo = open_repo(root)?;
    let mut index = repo.index()?;
    let path = Path::new(rel);

    if root.join(rel).is_file() {
        index
            .add_path(path)
            .with_context(|| format!("Failed to add {rel} to index"))?;
    } else {
        index
            .remove_path(path)
            .with_context(|| format!("Failed to remove {rel} from index"))?;
    }

    index.write().context("Failed to write index")?;
    Ok(())
}

/// Unstage `rel` (like `git reset -- <rel>`).
pub fn unstage(root: &Path, rel: &str) -> Result<()> {
    let repo = open_repo(root)?;

    match head_commit(&repo)? {
        Some(head) => {
            repo.reset_default(Some(head.as_object()), [rel])
                .with_context(|| format!("Failed to reset {rel}"))?;
        }
        None => {
            // Nothing committed yet: unstaging means dropping the entry.
            let mut index = repo.index()?;
            index
                .remove_path(Path::new(rel))
                .with_context(|| format!("Failed to remove {rel} from index"))?;
            index.write().context("Failed to write index")?;
        }
    }

    Ok(())
}

/// Create a commit with the staged changes
pub fn commit(root: &Path, message: &str, identity: &Identity) -> Result<String> {
    let repo = open_repo(root)?;
    let sig = signature(&repo, identity)?;

    // Get the tree from the index
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent_commit = head_commit(&repo)?;
    let parents = match &parent_commit {
        Some(p) => vec![p],
        None => vec![], // Initial commit
    };

    let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

    Ok(oid.to_string())
}

/// Rewrite HEAD with the current index tree and `message`
/// (like `git commit --amend -m <message>`).
pub fn amend(root: &Path, message: &str, identity: &Identity) -> Result<String> {
    let repo = open_repo(root)?;
    let Some(head) = head_commit(&repo)? else {
        bail!("no commit to amend");
    };
    let sig = signature(&repo, identity)?;

    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let oid = head
        .amend(Some("HEAD"), None, Some(&sig), None, Some(message), Some(&tree))
        .context("Failed to amend HEAD")?;

    Ok(oid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{has_staged_changes, head_entry, index_entry};
    use std::fs;
    use tempfile::TempDir;

    fn init_empty() -> (TempDir, git2::Repository) {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn id() -> Identity {
        Identity {
            name: "Test".into(),
            email: "test@test.com".into(),
        }
    }

    #[test]
    fn test_add_and_unstage_before_first_commit() {
        let (dir, _) = init_empty();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        add(dir.path(), "a.txt").unwrap();
        assert!(index_entry(dir.path(), "a.txt").unwrap().is_some());

        unstage(dir.path(), "a.txt").unwrap();
        assert!(index_entry(dir.path(), "a.txt").unwrap().is_none());
    }

    #[test]
    fn test_commit_and_amend() {
        let (dir, repo) = init_empty();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        add(dir.path(), "a.txt").unwrap();
        commit(dir.path(), "first", &id()).unwrap();
        assert!(head_entry(dir.path(), "a.txt").unwrap().is_some());
        assert!(!has_staged_changes(dir.path()).unwrap());

        fs::write(dir.path().join("a.txt"), "two").unwrap();
        add(dir.path(), "a.txt").unwrap();
        assert!(has_staged_changes(dir.path()).unwrap());
        amend(dir.path(), "first, amended", &id()).unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("first, amended"));
        assert_eq!(head.parent_count(), 0);
        assert!(!has_staged_changes(dir.path()).unwrap());
    }

    #[test]
    fn test_add_missing_file_stages_deletion() {
        let (dir, _) = init_empty();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        add(dir.path(), "a.txt").unwrap();
        commit(dir.path(), "first", &id()).unwrap();

        fs::remove_file(dir.path().join("a.txt")).unwrap();
        add(dir.path(), "a.txt").unwrap();
        assert!(index_entry(dir.path(), "a.txt").unwrap().is_none());

        unstage(dir.path(), "a.txt").unwrap();
        assert_eq!(
            index_entry(dir.path(), "a.txt").unwrap(),
            head_entry(dir.path(), "a.txt").unwrap()
        );
    }

    #[test]
    fn test_amend_without_head_fails() {
        let (dir, _) = init_empty();
        assert!(amend(dir.path(), "nothing", &id()).is_err());
    }
}
