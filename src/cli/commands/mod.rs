//! Subcommands module for cli-units CLI
//!
//! This module contains all the subcommand implementations.

pub mod parse;
pub mod read;
pub mod render;
pub mod units;
pub mod write;

use crate::cli::output::OutputFormatter;
use crate::config::{Config, SessionKind};
use anyhow::{Context, Result};
use cli_units::device::Device;
use cli_units::platform::Platform;
use cli_units::session::{Cli as Session, ProcessCli, ReplayCli};
use cli_units::unit::UnitRegistry;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration, with command-line overrides applied
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Verbosity level
    pub verbosity: u8,
    /// Platform given on the command line, if any
    pub platform_flag: Option<Platform>,
    /// Translation units
    pub registry: UnitRegistry,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, mut config: Config) -> Self {
        if let Some(platform) = cli.platform {
            config.device.platform = platform;
        }
        if let Some(fixtures) = &cli.fixtures {
            config.device.fixtures = Some(fixtures.clone());
            config.device.session = SessionKind::Replay;
        }

        let use_color = !cli.no_color && config.output.color;
        if !use_color {
            colored::control::set_override(false);
        }
        let output = OutputFormatter::new(use_color, cli.output, cli.verbosity());

        Self {
            config,
            output,
            verbosity: cli.verbosity(),
            platform_flag: cli.platform,
            registry: UnitRegistry::with_builtins(),
        }
    }

    /// Open the configured session
    pub fn session(&self) -> Result<Arc<dyn Session>> {
        let device = &self.config.device;
        match device.session {
            SessionKind::Replay => {
                let path = device
                    .fixtures
                    .as_ref()
                    .context("Replay session needs a fixture file (--fixtures or device.fixtures)")?;
                self.output
                    .debug(&format!("Replaying fixtures from {}", path.display()));
                Ok(Arc::new(ReplayCli::from_file(path)?))
            }
            SessionKind::Process => {
                let program = device
                    .program
                    .as_deref()
                    .context("Process session needs device.program")?;
                let identifier = device.hostname.clone().unwrap_or_else(|| "local".to_string());
                self.output.debug(&format!("Running commands via '{}'", program));
                Ok(Arc::new(
                    ProcessCli::new(identifier, program)?.with_timeout(device.timeout),
                ))
            }
        }
    }

    /// Build the device handle and prepare the session
    pub async fn device(&self) -> Result<Device> {
        let mut device = Device::new(self.session()?, self.config.device.platform);
        if let Some(hostname) = &self.config.device.hostname {
            device = device.with_hostname(hostname.clone());
        }
        device.prepare().await?;
        Ok(device)
    }
}

/// Load a YAML or JSON data file
pub fn load_data(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_data_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: Loopback0\nmtu: 1500").unwrap();

        let value = load_data(file.path()).unwrap();
        assert_eq!(value["name"], "Loopback0");
        assert_eq!(value["mtu"], 1500);
    }

    #[test]
    fn test_load_data_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"as\": 65000}}").unwrap();

        let value = load_data(file.path()).unwrap();
        assert_eq!(value["as"], 65000);
    }

    #[test]
    fn test_load_data_missing() {
        assert!(load_data(Path::new("/nonexistent/data.yaml")).is_err());
    }
}
