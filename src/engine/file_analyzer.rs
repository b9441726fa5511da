//! Reading source files for analysis and refactoring.

use crate::discovery::MAX_FILE_SIZE;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a Python source file.
///
/// Metadata is taken from the opened descriptor rather than the path, so the
/// size and regular-file checks apply to the bytes actually read.
pub fn read_source(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path).map_err(|e| Error::io(file_path, e))?;
    let metadata = file.metadata().map_err(|e| Error::io(file_path, e))?;

    if !metadata.is_file() {
        return Err(Error::io(
            file_path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(Error::io(
            file_path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "file too large: {} bytes (max: {} bytes)",
                    metadata.len(),
                    MAX_FILE_SIZE
                ),
            ),
        ));
    }

    let mut source = String::with_capacity(metadata.len() as usize);
    file.read_to_string(&mut source)
        .map_err(|e| Error::io(file_path, e))?;

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_source_success() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("app.py");
        std::fs::write(&file_path, "x = 1\n").unwrap();

        assert_eq!(read_source(&file_path).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_read_source_not_found() {
        let err = read_source(Path::new("/nonexistent/app.py")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_read_source_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(read_source(tmp.path()).is_err());
    }

    #[test]
    fn test_read_source_rejects_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("latin1.py");
        std::fs::write(&file_path, [0x73, 0x20, 0x3d, 0x20, 0xe9, 0x0a]).unwrap();
        assert!(read_source(&file_path).is_err());
    }
}
