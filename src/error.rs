//! Custom error types for py-perf.
//!
//! Provides structured error handling with clear error categories.

use crate::ast::unparse::UnparseError;
use crate::engine::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during py-perf operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The source text is not valid Python.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Failed to read or access a file.
    #[error("IO error for {path}: {source}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to load or parse configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The rewritten tree could not be turned back into text.
    #[error("Failed to render rewritten source: {0}")]
    Unparse(#[from] UnparseError),
}

impl Error {
    /// Create an IO error for a specific file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err: Error = ParseError {
            message: "invalid syntax".to_string(),
            line: 3,
            column: 7,
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("invalid syntax"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/path/to/missing.py", io_err);
        let msg = err.to_string();
        assert!(msg.contains("/path/to/missing.py"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("formatter command is empty");
        assert!(err.to_string().contains("formatter command is empty"));
    }
}
