//! CLI module for cli-units
//!
//! This module provides the command-line interface for cli-units,
//! including argument parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use cli_units::platform::Platform;
use std::path::PathBuf;

/// cli-units - translate structured configuration to and from vendor CLIs
#[derive(Parser, Debug, Clone)]
#[command(name = "cli-units")]
#[command(version)]
#[command(about = "Translate structured configuration to and from vendor CLIs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "CLI_UNITS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device platform (cisco_ios, cisco_iosxr, juniper_junos, huawei, generic)
    #[arg(short = 'p', long, global = true)]
    pub platform: Option<Platform>,

    /// Fixture file answering device commands
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a command template
    Render(commands::render::RenderArgs),

    /// Parse captured output with a rules file
    Parse(commands::parse::ParseArgs),

    /// Read the configuration node at a path
    Read(commands::read::ReadArgs),

    /// List the entries of a list node
    List(commands::read::ListArgs),

    /// Write a configuration change to a path
    Write(commands::write::WriteArgs),

    /// Show registered translation units
    Units(commands::units::UnitsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
