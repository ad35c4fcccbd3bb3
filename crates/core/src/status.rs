use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use scc_git::BlobId;

/// Classification of one path against working tree, index and HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Present on disk, unknown to index and HEAD.
    New,
    /// In the index, not yet committed.
    Added,
    /// Committed and unchanged.
    Tracked,
    /// Committed; the working tree differs and nothing is staged.
    Modified,
    /// Committed; the index holds a change.
    Staged,
    /// Committed; missing from the working tree, deletion not staged.
    Deleted,
    /// Committed; deletion staged.
    Removed,
    /// Untracked and matched by ignore rules.
    Ignored,
}

impl FileStatus {
    /// Whether the status is worth listing among changed files.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Tracked | Self::Ignored)
    }

    /// Short code in the spirit of `git status --short`.
    pub fn code(self) -> &'static str {
        match self {
            Self::New => "??",
            Self::Added => "A ",
            Self::Tracked => "  ",
            Self::Modified => " M",
            Self::Staged => "M ",
            Self::Deleted => " D",
            Self::Removed => "D ",
            Self::Ignored => "!!",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Added => "added",
            Self::Tracked => "tracked",
            Self::Modified => "modified",
            Self::Staged => "staged",
            Self::Deleted => "deleted",
            Self::Removed => "removed",
            Self::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// A changed path and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFileEntry {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl fmt::Display for ChangedFileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.code(), self.path.display())
    }
}

/// Blob ids of one path on each of the three axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Axes {
    pub worktree: Option<BlobId>,
    pub index: Option<BlobId>,
    pub head: Option<BlobId>,
}

/// Derive the status of a path from its three axes.
///
/// The index wins over the working tree: once a change is staged the path
/// reports `Staged` even if the file was edited again afterwards. `ignored`
/// only matters for paths that are neither committed nor staged.
pub fn classify(axes: &Axes, ignored: bool) -> Option<FileStatus> {
    let Axes {
        worktree,
        index,
        head,
    } = axes;

    let Some(head) = head else {
        return match (index, worktree) {
            (Some(_), _) => Some(FileStatus::Added),
            (None, Some(_)) if ignored => Some(FileStatus::Ignored),
            (None, Some(_)) => Some(FileStatus::New),
            (None, None) => None,
        };
    };

    let status = match (index, worktree) {
        (None, _) => FileStatus::Removed,
        (Some(staged), _) if staged != head => FileStatus::Staged,
        (Some(_), None) => FileStatus::Deleted,
        (Some(_), Some(current)) if current != head => FileStatus::Modified,
        (Some(_), Some(_)) => FileStatus::Tracked,
    };
    Some(status)
}
