//! External code formatters for rewritten source.
//!
//! Formatting is best effort: if the formatter is missing or rejects its
//! input, the caller keeps the unformatted text.

use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("formatter command is empty")]
    EmptyCommand,

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while talking to formatter: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("formatter output is not valid UTF-8")]
    InvalidUtf8,
}

/// Something that can reformat Python source text.
pub trait SourceFormatter {
    /// Short name for log messages.
    fn name(&self) -> &str;

    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// A formatter run as a child process reading stdin and writing stdout,
/// such as `black -q -`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line, program first.
    pub fn from_command(command: &[String]) -> Result<Self, FormatError> {
        let (program, args) = command.split_first().ok_or(FormatError::EmptyCommand)?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    pub fn black() -> Self {
        Self::new("black", vec!["-q".to_string(), "-".to_string()])
    }
}

impl SourceFormatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread; a formatter that starts writing
        // before it has read everything would otherwise fill the pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("child stdin unavailable"))?;
        let input = source.to_owned();
        let feeder = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let fed = feeder
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        // A failing formatter may exit before reading its input, so the exit
        // status is reported ahead of any broken pipe.
        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed?;

        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidUtf8)
    }
}

/// Run `formatter`, falling back to `source` if it fails.
pub fn format_or_keep(formatter: &dyn SourceFormatter, source: String) -> String {
    match formatter.format(&source) {
        Ok(formatted) => {
            debug!(formatter = formatter.name(), "formatted output");
            formatted
        }
        Err(e) => {
            warn!(
                formatter = formatter.name(),
                error = %e,
                "formatter failed, keeping unformatted output"
            );
            source
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command() {
        let cmd = vec!["black".to_string(), "-q".to_string(), "-".to_string()];
        assert_eq!(
            CommandFormatter::from_command(&cmd).unwrap(),
            CommandFormatter::black()
        );
        assert!(matches!(
            CommandFormatter::from_command(&[]),
            Err(FormatError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let formatter = CommandFormatter::new("py-perf-no-such-formatter", vec![]);
        let err = formatter.format("x = 1\n").unwrap_err();
        assert!(matches!(err, FormatError::Spawn { .. }));
    }

    #[test]
    fn test_missing_program_keeps_source() {
        let formatter = CommandFormatter::new("py-perf-no-such-formatter", vec![]);
        assert_eq!(format_or_keep(&formatter, "x  =  1\n".into()), "x  =  1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_command() {
        let formatter = CommandFormatter::new("cat", vec![]);
        assert_eq!(formatter.format("x = [1]\n").unwrap(), "x = [1]\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command() {
        let formatter = CommandFormatter::new("false", vec![]);
        let err = formatter.format("x = 1\n").unwrap_err();
        assert!(matches!(err, FormatError::Failed { .. }));
        assert_eq!(format_or_keep(&formatter, "x = 1\n".into()), "x = 1\n");
    }
}
