use colored::Colorize;

use scc_core::{ChangedFileEntry, FileStatus};

pub fn print_changes(entries: &[ChangedFileEntry]) {
    if entries.is_empty() {
        println!("{}", "nothing to commit, working tree clean".dimmed());
        return;
    }

    for entry in entries {
        let code = entry.status.code();
        let code = match entry.status {
            FileStatus::Added | FileStatus::Staged | FileStatus::Removed => code.green(),
            FileStatus::New => code.red().dimmed(),
            _ => code.red(),
        };
        println!("{code} {}", entry.path.display());
    }
}

pub fn print_status(path: &str, status: Option<FileStatus>) {
    match status {
        Some(status) => println!("{}: {}", path.bold(), status),
        None => println!("{}: {}", path.bold(), "not present".dimmed()),
    }
}

pub fn print_diff(diff: &str) {
    if diff.is_empty() {
        println!("{}", "no changes".dimmed());
        return;
    }

    for line in diff.lines() {
        if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}

pub fn print_done(message: &str) {
    println!("{}", message.dimmed());
}
