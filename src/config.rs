use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::format::CommandFormatter;

/// Name of the configuration file looked up next to the analysed path.
pub const CONFIG_FILE: &str = "py-perf.toml";

/// Maximum config file size (1 MB) - prevents memory exhaustion from malformed files
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub formatter: FormatterConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatterConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Program and arguments; source goes to stdin, formatted text comes
    /// back on stdout.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_command() -> Vec<String> {
    vec!["black".to_string(), "-q".to_string(), "-".to_string()]
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: default_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "console".to_string()
}

fn default_color() -> String {
    "auto".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Load config from py-perf.toml in the given path, or return default
    ///
    /// # Arguments
    ///
    /// * `path` - File or directory being analysed; for a file the config is
    ///   looked up in its parent directory
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist or if the config file
    /// exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        let dir_path = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let config_path = dir_path.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let metadata = std::fs::metadata(&config_path)?;
        if metadata.len() > MAX_CONFIG_SIZE {
            anyhow::bail!(
                "Config file too large ({} bytes, max {} bytes): {}",
                metadata.len(),
                MAX_CONFIG_SIZE,
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.formatter.enabled && self.formatter.command.is_empty() {
            return Err(crate::Error::config(
                "[formatter] command must name a program when the formatter is enabled",
            ));
        }
        if !matches!(self.output.format.as_str(), "console" | "json") {
            return Err(crate::Error::config(format!(
                "unknown output format '{}' (expected \"console\" or \"json\")",
                self.output.format
            )));
        }
        if !matches!(self.output.color.as_str(), "auto" | "always" | "never") {
            return Err(crate::Error::config(format!(
                "unknown color setting '{}' (expected \"auto\", \"always\" or \"never\")",
                self.output.color
            )));
        }
        Ok(())
    }

    /// The formatter to run after a rewrite, if enabled.
    pub fn formatter(&self) -> Option<CommandFormatter> {
        if !self.formatter.enabled {
            return None;
        }
        CommandFormatter::from_command(&self.formatter.command).ok()
    }

    /// Generate default TOML config
    pub fn default_toml() -> &'static str {
        r#"# py-perf configuration

[formatter]
# Run on rewritten source; failures keep the unformatted text.
enabled = true
command = ["black", "-q", "-"]

[output]
format = "console"  # "console", "json"
color = "auto"      # "auto", "always", "never"
"#
    }
}
