//! Writing rewritten source back to disk.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),
}

/// Replace the contents of `path` with `contents`.
///
/// The text goes to a randomly named file in the same directory which is
/// then renamed over the target, so an interrupted write never leaves a
/// truncated source file behind. The target's permissions are kept.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), WriteError> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(WriteError::NotAFile(path.to_path_buf()));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent)?;

    temp_file.write_all(contents.as_bytes())?;
    temp_file.flush()?;
    temp_file
        .as_file()
        .set_permissions(metadata.permissions())?;

    temp_file
        .persist(path)
        .map_err(|e| WriteError::Io(e.error))?;

    Ok(())
}
