//! Session gateway to network devices.
//!
//! This module provides the boundary between translation handlers and the
//! device transport. Handlers never talk to a socket themselves: they hand
//! command text to a [`Cli`] implementation and get the raw device output
//! back.
//!
//! # Supported Sessions
//!
//! - **Replay**: Answers commands from a fixture map (captured device output)
//! - **Process**: Pipes each command through an external program such as
//!   `vtysh -c` or an SSH wrapper script
//!
//! Prompt handling, authentication and connection setup belong to whatever
//! sits behind the session; this crate only exchanges text.
//!
//! # Example
//!
//! ```rust,ignore
//! use cli_units::session::{Cli, ReplayCli};
//!
//! let cli = ReplayCli::new("r1")
//!     .with_response("show running-config | include ^interface", "interface Loopback0\n");
//! let output = cli.execute_and_read("show running-config | include ^interface").await?;
//! ```

/// External program session implementation.
pub mod process;

/// Fixture-backed session implementation.
pub mod replay;

use async_trait::async_trait;
use thiserror::Error;

pub use process::ProcessCli;
pub use replay::ReplayCli;

/// Errors that can occur while exchanging text with a device.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The command could not be executed.
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// The session has no answer for this command.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The device did not answer in time.
    #[error("Session timeout after {0} seconds")]
    Timeout(u64),

    /// The session was closed.
    #[error("Session closed")]
    Closed,

    /// Session configuration is invalid or incomplete.
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    /// I/O error during session operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// The session trait that all device gateways implement
#[async_trait]
pub trait Cli: Send + Sync {
    /// Get the session identifier (usually the device hostname)
    fn identifier(&self) -> &str;

    /// Send command text (one or more lines) and return the raw output
    async fn execute_and_read(&self, command: &str) -> SessionResult<String>;

    /// Execute multiple commands in order (default: sequential)
    async fn execute_batch(&self, commands: &[&str]) -> Vec<SessionResult<String>> {
        let mut results = Vec::with_capacity(commands.len());
        for cmd in commands {
            results.push(self.execute_and_read(cmd).await);
        }
        results
    }

    /// Close the session
    async fn close(&self) -> SessionResult<()> {
        Ok(())
    }
}

/// Normalize a command for lookups: collapse runs of whitespace.
pub(crate) fn normalize_command(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}
