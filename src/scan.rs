//! Working-copy discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug)]
pub enum ScanError {
    /// The scan root does not exist (or could not be resolved).
    PathNotFound(PathBuf),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::PathNotFound(path) => {
                write!(f, "path not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Expand `~`, resolve symlinks, and require the result to exist.
pub fn resolve_root(raw: &str) -> Result<PathBuf, ScanError> {
    let expanded = shellexpand::tilde(raw);
    dunce::canonicalize(expanded.as_ref())
        .map_err(|_| ScanError::PathNotFound(PathBuf::from(expanded.as_ref())))
}

/// Find every directory under `root` that directly contains a `.git`
/// metadata directory. Results are sorted for reproducible output.
///
/// The `.git` subtree itself is never descended into, and unreadable
/// directories are skipped with a warning rather than aborting the scan.
pub fn find_repositories(root: &Path) -> Vec<PathBuf> {
    let mut repos = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable path: {}", err);
                continue;
            }
        };
        if entry.file_type().is_dir() && entry.path().join(".git").is_dir() {
            repos.push(entry.path().to_path_buf());
        }
    }

    repos.sort();
    repos
}
