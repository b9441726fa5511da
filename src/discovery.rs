//! Python file discovery for the engine.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Maximum file size to analyze (10 MB).
///
/// Files larger than this are skipped to prevent memory exhaustion.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Discover all Python files at the given path.
///
/// This function walks the directory tree, filtering out:
/// - Hidden directories (starting with `.`), which covers `.venv` and `.git`
/// - Virtualenvs, bytecode caches, and build output
/// - Files that are too large
/// - Symlinks
///
/// Results are sorted so reports come out in a stable order.
pub fn discover_python_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // Symlinks inside the tree are not followed; the root itself may be one.
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let file_path = entry.path();
        if !file_path.extension().is_some_and(|ext| ext == "py" || ext == "pyi") {
            continue;
        }

        match std::fs::symlink_metadata(file_path) {
            Ok(meta) if meta.is_file() => {
                if meta.len() > MAX_FILE_SIZE {
                    warn!(
                        path = %file_path.display(),
                        size = meta.len(),
                        max = MAX_FILE_SIZE,
                        "skipping file: too large"
                    );
                    continue;
                }
                files.push(file_path.to_path_buf());
            }
            // Not a regular file (could be symlink), skip silently
            Ok(_) => continue,
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "cannot read metadata");
                continue;
            }
        }
    }

    files.sort();
    files
}

/// Check if a directory entry should be excluded from traversal.
///
/// The root directory (depth 0) is never excluded, even if it starts with `.`.
pub fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    if entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();

    if name.starts_with('.') {
        return true;
    }

    matches!(
        name.as_ref(),
        "__pycache__"
            | "venv"
            | "env"
            | "site-packages"
            | "node_modules"
            | "build"
            | "dist"
    ) || name.ends_with(".egg-info")
}
