//! Configuration management for process patterns and retry settings.
//!
//! Stores configuration in JSON format at `~/.appkiller/config.json`.
//! A missing file means "use the defaults", which target Cursor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{PatternSet, RetryPolicy};
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Patterns recognizing the target application's processes.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Patterns for processes that must never be terminated (this tool, helpers).
    #[serde(default = "default_self_exclusions")]
    pub self_exclusions: Vec<String>,

    /// Also match patterns against full command lines.
    #[serde(default)]
    pub match_command_line: bool,

    /// Termination rounds before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between termination rounds, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Time a process gets to exit after the graceful request, in milliseconds.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Bound on each OS utility call, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Polls when waiting for the user to close the application.
    #[serde(default = "default_wait_attempts")]
    pub wait_attempts: u32,

    /// Delay between those polls, in milliseconds.
    #[serde(default = "default_wait_delay_ms")]
    pub wait_delay_ms: u64,
}

fn default_patterns() -> Vec<String> {
    vec![
        "cursor".to_string(),
        "cursor.exe".to_string(),
        "cursor helper*".to_string(),
    ]
}

fn default_self_exclusions() -> Vec<String> {
    vec!["appkiller*".to_string()]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_grace_period_ms() -> u64 {
    500
}

fn default_command_timeout_ms() -> u64 {
    10_000
}

fn default_wait_attempts() -> u32 {
    3
}

fn default_wait_delay_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            self_exclusions: default_self_exclusions(),
            match_command_line: false,
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            grace_period_ms: default_grace_period_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            wait_attempts: default_wait_attempts(),
            wait_delay_ms: default_wait_delay_ms(),
        }
    }
}

impl Config {
    /// Check the configuration without building anything from it.
    pub fn validate(&self) -> Result<()> {
        self.pattern_set()?;
        self.retry_policy()?;
        self.wait_policy()?;
        if self.command_timeout_ms == 0 {
            return Err(Error::Config(
                "commandTimeoutMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Compile the target and self-exclusion patterns.
    pub fn pattern_set(&self) -> Result<PatternSet> {
        Ok(PatternSet::new(&self.patterns, &self.self_exclusions)?
            .with_command_line(self.match_command_line))
    }

    /// Retry policy for terminating the application.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    /// Retry policy for passively waiting on the user.
    pub fn wait_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(self.wait_attempts, Duration::from_millis(self.wait_delay_ms))
    }

    /// Grace period between the graceful and forceful requests.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Bound on each OS utility call.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Configuration store for managing app settings.
///
/// Handles reading and writing configuration to `~/.appkiller/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.appkiller/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_dir = home.join(".appkiller");
        let config_path = config_dir.join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path to the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        // Ensure config directory exists
        let config_dir = self.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        // Serialize with pretty printing
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Write the default configuration unless a file already exists.
    ///
    /// Returns `true` if a file was written.
    pub async fn init(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        self.save(&Config::default()).await?;
        Ok(true)
    }
}
