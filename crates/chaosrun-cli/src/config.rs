//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use chaosrun_exec::SshRunnerConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CHAOSRUN_CONFIG";

/// Top-level configuration for the chaosrun CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SSH client settings
    #[serde(default)]
    pub ssh: SshConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SSH client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    /// SSH executable name or path
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Local wait window in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SshConfig {
    /// Runner configuration for these settings
    #[must_use]
    pub fn runner_config(&self) -> SshRunnerConfig {
        SshRunnerConfig::default()
            .with_program(&self.program)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn default_program() -> PathBuf {
    PathBuf::from(chaosrun_exec::ssh::DEFAULT_SSH_PROGRAM)
}

fn default_timeout_secs() -> u64 {
    chaosrun_exec::ssh::DEFAULT_TIMEOUT.as_secs()
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Locate a config file
    ///
    /// An explicit path wins, then `CHAOSRUN_CONFIG`, then the first
    /// existing file among the common locations.
    pub fn find(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let mut paths = vec![
            PathBuf::from("chaosrun.toml"),
            PathBuf::from("/etc/chaosrun/chaosrun.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("chaosrun/chaosrun.toml"));
        }

        paths.into_iter().find(|p| p.exists())
    }

    /// Load the located config file, or defaults if there is none
    ///
    /// # Errors
    /// Returns error if a located file cannot be read or parsed
    pub fn load_or_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        match Self::find(explicit) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Config::default(), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ssh.program, PathBuf::from("ssh"));
        assert_eq!(config.ssh.timeout_secs, 40);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [ssh]
            timeout_secs = 90

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.ssh.program, PathBuf::from("ssh"));
        assert_eq!(config.ssh.timeout_secs, 90);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);

        let runner = config.ssh.runner_config();
        assert_eq!(runner.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("[ssh]\ntimeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ssh]\nprogram = \"/opt/ssh/bin/ssh\"").unwrap();

        let (config, source) = Config::load_or_default(Some(file.path())).unwrap();

        assert_eq!(source.as_deref(), Some(file.path()));
        assert_eq!(config.ssh.program, PathBuf::from("/opt/ssh/bin/ssh"));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Config::load_or_default(Some(&missing)).is_err());
    }
}
