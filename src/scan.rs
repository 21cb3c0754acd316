//! Local directory discovery
//!
//! Walks the repository root and lists every directory below it. The walk
//! is iterative (walkdir keeps its own stack), so deep or wide trees do not
//! grow the call stack.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ScanError;

/// Directory names whose contents are never walked. The directory itself is
/// still reported.
pub const IGNORED_FOLDERS: [&str; 3] = [".git", "node_modules", "dist"];

/// A directory found on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct LocalFolder {
    pub path: PathBuf,
    /// Final path segment
    pub name: String,
}

impl LocalFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Whether walking stops at this directory
    pub fn is_ignored(&self) -> bool {
        IGNORED_FOLDERS.contains(&self.name.as_str())
    }
}

/// List every directory under `root` in depth-first pre-order.
///
/// Directories named like one of [`IGNORED_FOLDERS`] are returned but not
/// descended into. Symbolic links are not followed. Siblings are visited in
/// file name order. A relative root is made absolute against the current
/// directory, so every returned path is absolute. Subdirectories that cannot
/// be read are logged and skipped; only a bad root is an error.
pub fn scan(root: &Path) -> Result<Vec<LocalFolder>, ScanError> {
    let root = std::path::absolute(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let root = root.as_path();

    let metadata = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScanError::MissingRoot(root.to_path_buf())
        } else {
            ScanError::Io {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    debug!("Scanning {}", root.display());

    let mut folders = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let folder = LocalFolder::new(entry.path());
        if folder.is_ignored() {
            walker.skip_current_dir();
        }
        folders.push(folder);
    }

    debug!("Found {} directories under {}", folders.len(), root.display());
    Ok(folders)
}

/// Select the scanned folders that are git working copies, i.e. the ones
/// with a `.git` entry directly inside them. Worktrees and submodules keep a
/// `.git` file instead of a directory and count as well.
pub fn git_working_copies(folders: &[LocalFolder]) -> Vec<LocalFolder> {
    folders
        .iter()
        .filter(|f| !f.is_ignored() && f.path.join(".git").symlink_metadata().is_ok())
        .cloned()
        .collect()
}
