mod ui;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use scc_core::config::{self, TrackerConfig};
use scc_core::{BackendKind, FileStatusTracker};

#[derive(Parser)]
#[command(name = "scc", about = "File status tracking over a git working directory")]
struct Cli {
    /// Directory to resolve the repository from (default: current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Talk to a git executable instead of libgit2
    #[arg(long, global = true)]
    cli_backend: bool,

    /// Path of the git executable (implies --cli-backend)
    #[arg(long, global = true)]
    git: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a repository in the target directory
    Init,
    #[command(flatten)]
    Tracked(TrackedCommand),
}

/// Subcommands that run against an opened tracker.
#[derive(Subcommand)]
enum TrackedCommand {
    /// List changed files, or the status of the given paths
    Status {
        paths: Vec<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Stage a file (content or deletion)
    Stage { path: PathBuf },
    /// Reset a file's index entry to the last commit
    Unstage { path: PathBuf },
    /// Commit staged changes
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// Replace the last commit with the staged changes
    Amend {
        #[arg(short, long)]
        message: String,
    },
    /// Diff a file against its last committed content
    Diff { path: PathBuf },
    /// Print a file as of the last commit
    Show { path: PathBuf },
    /// Print the last commit message
    Message,
    /// Print the current branch
    Branch,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SCC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli, dir: &Path) -> TrackerConfig {
    let mut settings = config::load_settings(dir);
    if let Some(git) = &cli.git {
        settings.git_executable = Some(git.clone());
        settings.backend = Some(BackendKind::Cli);
    } else if cli.cli_backend {
        settings.backend = Some(BackendKind::Cli);
    }
    settings
}

fn run(cli: Cli) -> Result<()> {
    let dir = match &cli.repo {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let settings = build_config(&cli, &dir);
    tracing::debug!(config = ?settings, "loaded settings");

    let command = match cli.command {
        Command::Init => {
            let root = FileStatusTracker::init(&dir, &settings)?;
            ui::print_done(&format!("Initialized repository in {}", root.display()));
            return Ok(());
        }
        Command::Tracked(command) => command,
    };

    let tracker = FileStatusTracker::new(&dir, settings)?;
    if !tracker.has_repository() {
        eprintln!(
            "{}",
            format!("no repository above {}", dir.display()).yellow()
        );
    }

    match command {
        TrackedCommand::Status { paths, json } if paths.is_empty() => {
            let changes = tracker.changed_files()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&changes)?);
            } else {
                ui::print_changes(&changes);
            }
        }
        TrackedCommand::Status { paths, json } => {
            let mut statuses = Vec::with_capacity(paths.len());
            for path in &paths {
                statuses.push((path.display().to_string(), tracker.get_status(path)?));
            }
            if json {
                let map: serde_json::Map<String, serde_json::Value> = statuses
                    .into_iter()
                    .map(|(p, s)| -> Result<(String, serde_json::Value)> {
                        Ok((p, serde_json::to_value(s)?))
                    })
                    .collect::<Result<_>>()?;
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for (path, status) in statuses {
                    ui::print_status(&path, status);
                }
            }
        }
        TrackedCommand::Stage { path } => {
            tracker.stage_file(&path)?;
            ui::print_status(&path.display().to_string(), tracker.get_status(&path)?);
        }
        TrackedCommand::Unstage { path } => {
            tracker.unstage_file(&path)?;
            ui::print_status(&path.display().to_string(), tracker.get_status(&path)?);
        }
        TrackedCommand::Commit { message } => {
            tracker.commit(&message)?;
            ui::print_done("Committed.");
        }
        TrackedCommand::Amend { message } => {
            tracker.amend_commit(&message)?;
            ui::print_done("Amended last commit.");
        }
        TrackedCommand::Diff { path } => {
            ui::print_diff(&tracker.diff_file(&path)?);
        }
        TrackedCommand::Show { path } => match tracker.get_file_content(&path)? {
            Some(bytes) => std::io::stdout().write_all(&bytes)?,
            None => bail!("{} has no committed version", path.display()),
        },
        TrackedCommand::Message => match tracker.last_commit_message()? {
            Some(message) => println!("{}", message.trim_end()),
            None => ui::print_done("no commits yet"),
        },
        TrackedCommand::Branch => match tracker.current_branch()? {
            Some(branch) => println!("{branch}"),
            None => ui::print_done("no branch"),
        },
    }

    Ok(())
}

fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}: {e:#}", "Error".red());
        std::process::exit(1);
    }
}
