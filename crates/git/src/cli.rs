//! Engine backed by a `git` executable, for setups that point at a specific
//! git installation instead of the bundled libgit2.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, bail};

use crate::backend::{Backend, BlobId, Identity};

/// Shells out to `program` for every query, run from the working directory
/// root with literal pathspecs and NUL-terminated output.
#[derive(Debug, Clone)]
pub struct GitCliBackend {
    program: PathBuf,
    root: PathBuf,
}

impl GitCliBackend {
    /// Bind to the working directory `root`, failing if `program` does not
    /// recognise `root/.git` itself as a repository.
    pub fn open(program: &Path, root: &Path) -> Result<Self> {
        let backend = Self {
            program: program.to_path_buf(),
            root: root.to_path_buf(),
        };
        // Explicit --git-dir: no discovery upward past a broken `.git`.
        let git_dir = format!("--git-dir={}", root.join(".git").display());
        backend
            .git(&[git_dir.as_str(), "rev-parse", "--git-dir"])
            .with_context(|| format!("no git repository at {}", root.display()))?;
        Ok(backend)
    }

    /// Create an empty repository in `dir` (`git init -q`).
    pub fn init(program: &Path, dir: &Path) -> Result<()> {
        let output = Command::new(program)
            .args(["init", "-q"])
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to run {}", program.display()))?;
        check(&output, "init")?;
        Ok(())
    }

    /// Whether `program` can be spawned at all.
    pub fn is_available(program: &Path) -> bool {
        Command::new(program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(program = %self.program.display(), ?args, "spawning git");
        Command::new(&self.program)
            .arg("--literal-pathspecs")
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))
    }

    /// Run and return stdout, failing on a non-zero exit.
    fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args)?;
        check(&output, args.first().copied().unwrap_or("git"))?;
        Ok(output.stdout)
    }

    /// Run and map exit code 0 to `true`, 1 to `false`.
    fn git_flag(&self, args: &[&str]) -> Result<bool> {
        let output = self.output(args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("git {:?} failed ({}): {}", args, output.status, stderr.trim())
            }
        }
    }

    fn identity_args(&self, identity: &Identity) -> Result<Vec<String>> {
        let configured = self.git_flag(&["config", "--get", "user.name"])?
            && self.git_flag(&["config", "--get", "user.email"])?;
        if configured {
            return Ok(Vec::new());
        }

        Ok(vec![
            "-c".to_string(),
            format!("user.name={}", identity.name),
            "-c".to_string(),
            format!("user.email={}", identity.email),
        ])
    }

    fn run_commit(&self, message: &str, identity: &Identity, amend: bool) -> Result<()> {
        let mut args = self.identity_args(identity)?;
        args.extend(["commit", "-q"].map(String::from));
        if amend {
            args.extend(["--amend", "--allow-empty"].map(String::from));
        }
        args.push("--allow-empty-message".to_string());
        args.extend(["-m".to_string(), message.to_string()]);

        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.git(&refs)?;
        Ok(())
    }
}

impl Backend for GitCliBackend {
    fn head_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        if !self.has_head()? {
            return Ok(None);
        }
        let out = self.git(&["ls-tree", "-z", "HEAD", "--", rel])?;

        // <mode> SP <type> SP <object> TAB <path>
        for record in records(&out)? {
            let Some((meta, path)) = record.split_once('\t') else {
                continue;
            };
            let fields: Vec<&str> = meta.split(' ').collect();
            if path == rel && fields.len() == 3 && fields[1] == "blob" {
                return Ok(Some(BlobId::new(fields[2])));
            }
        }
        Ok(None)
    }

    fn index_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        let out = self.git(&["ls-files", "-s", "-z", "--", rel])?;

        // <mode> SP <object> SP <stage> TAB <path>
        for record in records(&out)? {
            let Some((meta, path)) = record.split_once('\t') else {
                continue;
            };
            let fields: Vec<&str> = meta.split(' ').collect();
            if path == rel && fields.len() == 3 && fields[2] == "0" {
                return Ok(Some(BlobId::new(fields[1])));
            }
        }
        Ok(None)
    }

    fn worktree_entry(&self, rel: &str) -> Result<Option<BlobId>> {
        if !self.root.join(rel).is_file() {
            return Ok(None);
        }
        let out = self.git(&["hash-object", "--", rel])?;
        let hex = String::from_utf8(out).context("hash-object printed non-UTF-8")?;
        Ok(Some(BlobId::new(hex.trim())))
    }

    fn is_ignored(&self, rel: &str) -> Result<bool> {
        self.git_flag(&["check-ignore", "-q", "--", rel])
    }

    fn changed_paths(&self) -> Result<Vec<String>> {
        let out = self.git(&[
            "status",
            "--porcelain=v1",
            "-z",
            "--untracked-files=all",
            "--no-renames",
        ])?;

        // XY SP <path>
        let mut paths = Vec::new();
        for record in records(&out)? {
            if record.len() < 4 || record.starts_with("!!") {
                continue;
            }
            paths.push(record[3..].to_string());
        }
        Ok(paths)
    }

    fn head_content(&self, rel: &str) -> Result<Option<Vec<u8>>> {
        let Some(id) = self.head_entry(rel)? else {
            return Ok(None);
        };
        let content = self.git(&["cat-file", "blob", id.as_str()])?;
        Ok(Some(content))
    }

    fn stage(&self, rel: &str) -> Result<()> {
        self.git(&["add", "-A", "-f", "--", rel])?;
        Ok(())
    }

    fn unstage(&self, rel: &str) -> Result<()> {
        if self.has_head()? {
            self.git(&["reset", "-q", "HEAD", "--", rel])?;
        } else {
            self.git(&["rm", "--cached", "-q", "--ignore-unmatch", "--", rel])?;
        }
        Ok(())
    }

    fn has_head(&self) -> Result<bool> {
        self.git_flag(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])
    }

    fn has_staged_changes(&self) -> Result<bool> {
        if self.has_head()? {
            // --quiet exits 1 when there are differences
            let clean = self.git_flag(&["diff", "--cached", "--quiet"])?;
            Ok(!clean)
        } else {
            Ok(!self.git(&["ls-files", "-z"])?.is_empty())
        }
    }

    fn commit(&self, message: &str, identity: &Identity) -> Result<()> {
        self.run_commit(message, identity, false)?;
        tracing::info!("created commit");
        Ok(())
    }

    fn amend(&self, message: &str, identity: &Identity) -> Result<()> {
        if !self.has_head()? {
            bail!("no commit to amend");
        }
        self.run_commit(message, identity, true)?;
        tracing::info!("amended HEAD");
        Ok(())
    }

    fn last_commit_message(&self) -> Result<Option<String>> {
        if !self.has_head()? {
            return Ok(None);
        }
        let out = self.git(&["log", "-1", "--format=%B"])?;
        let message = String::from_utf8_lossy(&out);
        Ok(Some(message.trim_end_matches('\n').to_string()))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        if !self.has_head()? {
            return Ok(None);
        }
        let output = self.output(&["symbolic-ref", "--short", "-q", "HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(name))
    }
}

fn check(output: &Output, what: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    bail!("git {what} failed ({}): {}", output.status, stderr.trim())
}

fn records(out: &[u8]) -> Result<Vec<&str>> {
    out.split(|b| *b == 0)
        .filter(|r| !r.is_empty())
        .map(|r| std::str::from_utf8(r).context("git printed a non-UTF-8 path"))
        .collect()
}
