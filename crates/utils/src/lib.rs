use std::path::{Component, Path, PathBuf};

/// Name of the directory (or gitfile) that marks a repository root.
pub const CONTROL_DIR: &str = ".git";

/// Returns `true` if `dir` directly contains the repository control entry.
pub fn is_repo_root(dir: &Path) -> bool {
    dir.join(CONTROL_DIR).exists()
}

/// Make `path` absolute against the current directory and fold `.`/`..`
/// components lexically. Symlinks are left alone so the result keeps the
/// spelling the caller used.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Convert `path` into a `/`-separated path relative to `root`, the form git
/// uses for index and tree entries.
///
/// Returns `None` when `path` is not under `root`, is `root` itself, or is
/// not valid UTF-8.
pub fn repo_relative(root: &Path, path: &Path) -> Option<String> {
    let abs = absolutize(path);
    let rel = abs.strip_prefix(absolutize(root)).ok()?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            _ => return None,
        }
    }

    if parts.is_empty() || parts[0] == CONTROL_DIR {
        return None;
    }

    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_folds_dots() {
        let p = absolutize(Path::new("/a/b/./c/../d"));
        assert_eq!(p, PathBuf::from("/a/b/d"));
    }

    #[test]
    fn absolutize_relative_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("x")), cwd.join("x"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/repo");
        let cases = [
            ("/repo/file.txt", Some("file.txt")),
            ("/repo/中文 1č/testč", Some("中文 1č/testč")),
            ("/repo/a/../b/c", Some("b/c")),
            ("/repo", None),
            ("/elsewhere/file", None),
            ("/repo/.git/config", None),
        ];

        for (path, expected) in cases {
            assert_eq!(
                repo_relative(root, Path::new(path)).as_deref(),
                expected,
                "relative path mismatch for {path}"
            );
        }
    }

    #[test]
    fn detects_control_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!is_repo_root(dir.path()));
        std::fs::create_dir(dir.path().join(CONTROL_DIR)).unwrap();
        assert!(is_repo_root(dir.path()));
    }
}
