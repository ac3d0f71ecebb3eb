//! Memory notes on disk.
//!
//! The browser only needs three things from its collaborator: a listing, the
//! root directory (to resolve relative paths) and a way to tell the index that
//! a file changed. `DirectoryIndex` is the plain-directory implementation the
//! binary uses.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use log::debug;

/// One note, relative to the memory directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    pub path: String,
    /// Last modification, milliseconds since the Unix epoch
    pub updated_at: i64,
}

pub trait MemoryIndex {
    fn list(&self) -> io::Result<Vec<MemoryFile>>;
    fn dir(&self) -> &Path;
    /// Re-index `rel` after it was written or removed.
    fn sync(&self, rel: &str) -> io::Result<()>;
}

pub struct DirectoryIndex {
    root: PathBuf,
}

impl DirectoryIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn modified_millis(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<MemoryFile>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        let meta = entry.metadata()?;
        if meta.is_dir() {
            walk(root, &path, out)?;
        } else if meta.is_file() {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            out.push(MemoryFile {
                path: rel.to_string_lossy().replace('\\', "/"),
                updated_at: modified_millis(&meta),
            });
        }
    }
    Ok(())
}

impl MemoryIndex for DirectoryIndex {
    fn list(&self) -> io::Result<Vec<MemoryFile>> {
        let mut files = Vec::new();
        walk(&self.root, &self.root, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn dir(&self) -> &Path {
        &self.root
    }

    fn sync(&self, rel: &str) -> io::Result<()> {
        let path = self.root.join(rel);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                debug!("Indexed {} ({} bytes)", rel, meta.len());
                Ok(())
            }
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{rel} is not a regular file"),
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Dropped {} from index", rel);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
