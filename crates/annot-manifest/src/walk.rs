//! Local directory traversal.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ManifestError;

/// Directories and files found under a local root, as absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTree {
    /// The root, made absolute.
    pub root: PathBuf,
    /// Directories to mirror, parents before children.
    pub dirs: Vec<PathBuf>,
    /// Every non-hidden file, at any depth.
    pub files: Vec<PathBuf>,
}

/// Make `path` absolute against the current directory without resolving
/// symlinks.
pub fn absolute(path: &Path) -> Result<PathBuf, ManifestError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ManifestError::Io {
        path: ".".to_string(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Walk `root`.
///
/// A directory is kept when its depth below `root` (the root itself being
/// depth 0) is less than `depth`, or always when `depth` is `None`. Files
/// are collected from every directory regardless of depth; names starting
/// with `.` are skipped.
///
/// # Errors
///
/// [`ManifestError::Walk`] if `root` or any entry under it cannot be read.
pub fn walk_local(root: &Path, depth: Option<usize>) -> Result<LocalTree, ManifestError> {
    let root = absolute(root)?;
    let mut tree = LocalTree {
        root: root.clone(),
        ..LocalTree::default()
    };

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| ManifestError::Walk {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        if entry.file_type().is_dir() {
            if depth.map_or(true, |max| entry.depth() < max) {
                tree.dirs.push(entry.into_path());
            }
        } else if !entry.file_name().to_string_lossy().starts_with('.') {
            tree.files.push(entry.into_path());
        }
    }

    tree.dirs.sort();
    tree.files.sort();
    tracing::debug!(
        root = %root.display(),
        dirs = tree.dirs.len(),
        files = tree.files.len(),
        "walked local tree"
    );
    Ok(tree)
}
