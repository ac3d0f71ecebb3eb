//! # Diffs and review comments
//!
//! Splitting a unified diff into per-file chunks, the review comments a user
//! attaches to diff lines, and the prompt those comments become.
//!
//! A `DiffSource` is whatever owns the worktree (an agent session). The pane
//! only asks it whether it has started and for its current stats.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

/// Snapshot of a worktree's changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub content: String,
    pub error: Option<String>,
}

impl DiffStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.content.trim().is_empty()
    }

    /// Build stats from raw diff text, counting `+`/`-` lines.
    pub fn from_content(content: String) -> Self {
        let (added, removed) = count_changes(&content);
        Self {
            added,
            removed,
            content,
            error: None,
        }
    }

    pub fn from_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

pub trait DiffSource {
    fn started(&self) -> bool;
    fn diff_stats(&self) -> DiffStats;
}

/// One file's slice of a unified diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChunk {
    pub path: String,
    pub added: usize,
    pub removed: usize,
    pub diff: String,
}

const FILE_HEADER: &str = "diff --git ";

pub fn is_added_line(line: &str) -> bool {
    line.starts_with('+') && !line.starts_with("+++")
}

pub fn is_removed_line(line: &str) -> bool {
    line.starts_with('-') && !line.starts_with("---")
}

fn count_changes(diff: &str) -> (usize, usize) {
    diff.lines().fold((0, 0), |(a, r), line| {
        (a + is_added_line(line) as usize, r + is_removed_line(line) as usize)
    })
}

/// Path named by a `diff --git a/OLD b/NEW` header: everything after the
/// first `" b/"`.
fn header_path(line: &str) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    match line.find(" b/") {
        Some(i) => line[i + 3..].to_string(),
        None => line[FILE_HEADER.len().min(line.len())..].to_string(),
    }
}

/// Split `diff` into per-file chunks.
///
/// Line endings are kept, so concatenating every chunk's `diff` gives back
/// the input. Text before the first file header (if any) is attached to the
/// first chunk. A diff without any file header has no chunks.
pub fn parse_file_chunks(diff: &str) -> Vec<FileChunk> {
    let mut chunks: Vec<FileChunk> = Vec::new();
    let mut preamble = String::new();

    for line in diff.split_inclusive('\n') {
        if line.starts_with(FILE_HEADER) {
            let mut chunk = FileChunk {
                path: header_path(line),
                ..FileChunk::default()
            };
            if chunks.is_empty() {
                chunk.diff = std::mem::take(&mut preamble);
            }
            chunks.push(chunk);
        }

        match chunks.last_mut() {
            Some(chunk) => {
                chunk.added += is_added_line(line) as usize;
                chunk.removed += is_removed_line(line) as usize;
                chunk.diff.push_str(line);
            }
            None => preamble.push_str(line),
        }
    }
    chunks
}

/// A review note attached to one line of a file's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment {
    pub file: String,
    /// 0-based line index into the file's chunk
    pub line: usize,
    /// `"+"`, `"-"` or `" "`
    pub marker: String,
    pub code: String,
    pub comment: String,
}

const COMMENTS_PREAMBLE: &str = "I reviewed your changes and left the following comments:\n\n";
const COMMENTS_TRAILER: &str = "Please address these comments and continue.";

/// Turn review comments into a prompt for the agent. Files are visited in
/// path order, comments within a file in the order they were added.
/// Returns an empty string when there are no comments.
pub fn format_comments_message(comments: &BTreeMap<String, Vec<LineComment>>) -> String {
    let mut out = String::new();
    for c in comments.values().flatten() {
        out.push_str(&format!(
            "[{} {}{}] `{}`\n  → {}\n\n",
            c.file, c.marker, c.line, c.code, c.comment
        ));
    }
    if out.is_empty() {
        return out;
    }
    format!("{COMMENTS_PREAMBLE}{out}{COMMENTS_TRAILER}")
}

/// A git worktree on disk, diffed with the `git` binary.
pub struct GitWorktree {
    path: PathBuf,
}

impl GitWorktree {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git_diff(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run git: {e}"))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }
}

impl DiffSource for GitWorktree {
    fn started(&self) -> bool {
        self.path.join(".git").exists()
    }

    fn diff_stats(&self) -> DiffStats {
        // A repository without commits has no HEAD to diff against
        let result = self
            .git_diff(&["diff", "HEAD"])
            .or_else(|e| {
                debug!("git diff HEAD failed ({}), retrying without HEAD", e);
                self.git_diff(&["diff"])
            });
        match result {
            Ok(content) => DiffStats::from_content(content),
            Err(e) => {
                warn!("Diff failed for {}: {}", self.path.display(), e);
                DiffStats::from_error(e)
            }
        }
    }
}
