//! Configuration module for cli-units
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/cli-units/config.toml)
//! - User configuration (<config dir>/cli-units/config.toml)
//! - Project configuration (./cli-units.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use cli_units::platform::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default command timeout in seconds
const DEFAULT_TIMEOUT: u64 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,

    /// Device and session settings
    pub device: DeviceConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither RUST_LOG nor -v is given
    pub level: Option<String>,

    /// Log format
    pub format: LogFormat,
}

/// How commands reach the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Answer from a fixture file of captured output
    #[default]
    Replay,
    /// Run an external program per command
    Process,
}

/// Device and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device platform
    pub platform: Platform,

    /// Session type
    pub session: SessionKind,

    /// Fixture file for replay sessions
    pub fixtures: Option<PathBuf>,

    /// Program line for process sessions, e.g. `vtysh -c`
    pub program: Option<String>,

    /// Command timeout in seconds
    pub timeout: u64,

    /// Hostname override
    pub hostname: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Generic,
            session: SessionKind::Replay,
            fixtures: None,
            program: None,
            timeout: DEFAULT_TIMEOUT,
            hostname: None,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colored output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from standard locations, then the environment
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        let env_path = std::env::var("CLI_UNITS_CONFIG").ok().map(PathBuf::from);
        let explicit = config_path.or(env_path.as_ref());

        for path in Self::get_config_paths(explicit) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            } else if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("/etc/cli-units/config.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cli-units").join("config.toml"));
        }
        paths.push(PathBuf::from("cli-units.toml"));
        paths
    }

    /// Load and merge a configuration file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; values that differ from the default win
    fn merge(&self, other: Config) -> Config {
        let defaults = DeviceConfig::default();
        Config {
            logging: LoggingConfig {
                level: other.logging.level.or_else(|| self.logging.level.clone()),
                format: if other.logging.format != LogFormat::default() {
                    other.logging.format
                } else {
                    self.logging.format
                },
            },
            device: DeviceConfig {
                platform: if other.device.platform != defaults.platform {
                    other.device.platform
                } else {
                    self.device.platform
                },
                session: if other.device.session != defaults.session {
                    other.device.session
                } else {
                    self.device.session
                },
                fixtures: other.device.fixtures.or_else(|| self.device.fixtures.clone()),
                program: other.device.program.or_else(|| self.device.program.clone()),
                timeout: if other.device.timeout != defaults.timeout {
                    other.device.timeout
                } else {
                    self.device.timeout
                },
                hostname: other.device.hostname.or_else(|| self.device.hostname.clone()),
            },
            output: OutputConfig {
                color: self.output.color && other.output.color,
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // CLI_UNITS_PLATFORM
        if let Ok(platform) = std::env::var("CLI_UNITS_PLATFORM") {
            if let Ok(p) = platform.parse() {
                self.device.platform = p;
            }
        }

        // CLI_UNITS_LOG_FORMAT
        if let Ok(format) = std::env::var("CLI_UNITS_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "text" => self.logging.format = LogFormat::Text,
                _ => {}
            }
        }

        // CLI_UNITS_FIXTURES
        if let Ok(path) = std::env::var("CLI_UNITS_FIXTURES") {
            self.device.fixtures = Some(PathBuf::from(path));
            self.device.session = SessionKind::Replay;
        }

        // CLI_UNITS_PROGRAM
        if let Ok(program) = std::env::var("CLI_UNITS_PROGRAM") {
            self.device.program = Some(program);
            self.device.session = SessionKind::Process;
        }

        // CLI_UNITS_TIMEOUT
        if let Ok(timeout) = std::env::var("CLI_UNITS_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.device.timeout = n;
            }
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.output.color = false;
        }
    }
}
