use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use scc_git::{Backend, GitCliBackend, Identity, Libgit2Backend};

/// Which engine a tracker talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// libgit2, in process.
    #[default]
    Libgit2,
    /// A `git` executable.
    Cli,
}

/// Engine settings threaded into every tracker, in the `settings.json` format:
///
/// ```json
/// {
///   "backend": "cli",
///   "gitExecutable": "/usr/local/bin/git",
///   "identity": { "name": "Jane", "email": "jane@example.com" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default)]
    pub backend: Option<BackendKind>,

    #[serde(default)]
    pub git_executable: Option<PathBuf>,

    #[serde(default)]
    pub identity: Option<Identity>,
}

impl TrackerConfig {
    /// Use the `git` executable at `program`.
    pub fn cli(program: impl Into<PathBuf>) -> Self {
        Self {
            backend: Some(BackendKind::Cli),
            git_executable: Some(program.into()),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// An explicit `backend` wins; otherwise naming an executable selects the
    /// CLI backend.
    pub fn backend_kind(&self) -> BackendKind {
        match (self.backend, &self.git_executable) {
            (Some(kind), _) => kind,
            (None, Some(_)) => BackendKind::Cli,
            (None, None) => BackendKind::Libgit2,
        }
    }

    pub fn git_program(&self) -> PathBuf {
        self.git_executable
            .clone()
            .unwrap_or_else(|| PathBuf::from("git"))
    }

    pub fn identity(&self) -> Identity {
        self.identity.clone().unwrap_or_default()
    }

    pub(crate) fn open_backend(&self, root: &Path) -> Result<Box<dyn Backend>> {
        Ok(match self.backend_kind() {
            BackendKind::Libgit2 => Box::new(Libgit2Backend::open(root)?),
            BackendKind::Cli => Box::new(GitCliBackend::open(&self.git_program(), root)?),
        })
    }

    pub(crate) fn init_repository(&self, dir: &Path) -> Result<()> {
        match self.backend_kind() {
            BackendKind::Libgit2 => Libgit2Backend::init(dir),
            BackendKind::Cli => GitCliBackend::init(&self.git_program(), dir),
        }
    }
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

/// Composable merge for layered configuration.
pub trait Mergeable {
    fn merge(self, other: Self) -> Self;
}

impl Mergeable for TrackerConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            backend: other.backend.or(self.backend),
            git_executable: other.git_executable.or(self.git_executable),
            identity: other.identity.or(self.identity),
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("scc"))
}

/// Load settings by merging two layers (fields set in later files win):
///
/// 1. `{config_dir}/scc/settings.json`: user settings
/// 2. `{project_dir}/.scc/settings.json`: project settings
pub fn load_settings(project_dir: &Path) -> TrackerConfig {
    let paths: Vec<PathBuf> = vec![
        config_dir().map(|d| d.join("settings.json")),
        Some(project_dir.join(".scc").join("settings.json")),
    ]
    .into_iter()
    .flatten()
    .collect();

    load_settings_from_paths(&paths)
}

/// Load and merge settings from an explicit list of file paths (in order).
/// Missing or malformed files are skipped.
pub fn load_settings_from_paths(paths: &[PathBuf]) -> TrackerConfig {
    paths
        .iter()
        .filter_map(|p| load_settings_file(p))
        .reduce(Mergeable::merge)
        .unwrap_or_default()
}

fn load_settings_file(path: &Path) -> Option<TrackerConfig> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed settings");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_is_libgit2() {
        let config = TrackerConfig::default();
        assert_eq!(config.backend_kind(), BackendKind::Libgit2);
        assert_eq!(config.git_program(), PathBuf::from("git"));
        assert_eq!(config.identity(), Identity::default());
    }

    #[test]
    fn executable_implies_cli_unless_overridden() {
        let mut config = TrackerConfig {
            git_executable: Some("/opt/git/bin/git".into()),
            ..Default::default()
        };
        assert_eq!(config.backend_kind(), BackendKind::Cli);

        config.backend = Some(BackendKind::Libgit2);
        assert_eq!(config.backend_kind(), BackendKind::Libgit2);
    }

    #[test]
    fn later_layer_overrides_set_fields_only() {
        let base = TrackerConfig {
            backend: Some(BackendKind::Cli),
            git_executable: Some("/usr/bin/git".into()),
            identity: None,
        };
        let overlay = TrackerConfig {
            backend: None,
            git_executable: Some("/opt/git".into()),
            identity: Some(Identity {
                name: "a".into(),
                email: "a@b".into(),
            }),
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.backend, Some(BackendKind::Cli));
        assert_eq!(merged.git_executable, Some(PathBuf::from("/opt/git")));
        assert_eq!(merged.identity.unwrap().name, "a");
    }

    #[test]
    fn parses_camel_case_json() {
        let config: TrackerConfig = serde_json::from_str(
            r#"{"backend":"cli","gitExecutable":"/bin/git","identity":{"name":"n","email":"e"}}"#,
        )
        .unwrap();
        assert_eq!(config.backend, Some(BackendKind::Cli));
        assert_eq!(config.git_executable, Some(PathBuf::from("/bin/git")));
        assert_eq!(config.identity().email, "e");
    }

    #[test]
    fn load_skips_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, r#"{"backend":"cli"}"#).unwrap();
        fs::write(&bad, "{ not json").unwrap();

        let config = load_settings_from_paths(&[
            dir.path().join("missing.json"),
            good,
            bad,
        ]);
        assert_eq!(config.backend, Some(BackendKind::Cli));
    }

    #[test]
    fn load_project_layer() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".scc")).unwrap();
        fs::write(
            dir.path().join(".scc/settings.json"),
            r#"{"gitExecutable":"/usr/bin/git"}"#,
        )
        .unwrap();

        let config = load_settings(dir.path());
        assert_eq!(config.git_executable, Some(PathBuf::from("/usr/bin/git")));
    }
}
