use std::path::Path;

use anyhow::{Context, Result};
use git2::{DiffFlags, DiffOptions, Patch};

/// Text returned when either side is binary and the contents differ.
pub const BINARY_DIFFERS: &str = "Binary files differ\n";

/// Unified diff of two content buffers, hunks only (no `diff --git` or
/// `---`/`+++` file headers), like `git diff --no-index` trimmed to its first
/// `@@` line.
///
/// Identical buffers yield an empty string.
pub fn diff_buffers(old: &[u8], new: &[u8], path: &str) -> Result<String> {
    if old == new {
        return Ok(String::new());
    }

    let path = Path::new(path);
    let mut patch = Patch::from_buffers(old, Some(path), new, Some(path), Some(&mut diff_opts()))
        .context("failed to diff buffers")?;

    if patch.delta().flags().contains(DiffFlags::BINARY) {
        return Ok(BINARY_DIFFERS.to_string());
    }
    if patch.num_hunks() == 0 {
        return Ok(String::new());
    }

    let buf = patch.to_buf().context("failed to render patch")?;
    let text = String::from_utf8_lossy(&buf);
    Ok(strip_file_headers(&text).to_string())
}

// ── helpers ──────────────────────────────────────────────────────────────

fn diff_opts() -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts.context_lines(3);
    opts
}

fn strip_file_headers(patch: &str) -> &str {
    if patch.starts_with("@@") {
        return patch;
    }
    match patch.find("\n@@") {
        Some(i) => &patch[i + 1..],
        None => patch,
    }
}
