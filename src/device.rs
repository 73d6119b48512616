//! Device handle used by readers and writers
//!
//! Wraps a session with the platform's dialect: `show` output is cached per
//! read transaction, and configuration blocks are wrapped in the dialect's
//! configuration mode and checked for device error output.

use crate::error::{Error, Result};
use crate::path::ConfigPath;
use crate::platform::{Dialect, Platform};
use crate::session::Cli;
use crate::unit::{ReadContext, WriteContext};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A device reachable through a CLI session
pub struct Device {
    /// Underlying session
    session: Arc<dyn Cli>,
    /// Device platform
    platform: Platform,
    /// Platform dialect
    dialect: Box<dyn Dialect>,
    /// Device hostname (for identification)
    hostname: String,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("hostname", &self.hostname)
            .field("platform", &self.platform)
            .finish()
    }
}

impl Device {
    /// Create a device; the hostname defaults to the session identifier
    pub fn new(session: Arc<dyn Cli>, platform: Platform) -> Self {
        let hostname = session.identifier().to_string();
        Self {
            session,
            platform,
            dialect: platform.dialect(),
            hostname,
        }
    }

    /// Override the hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Get the device platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Get the platform dialect
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Get the hostname/identifier
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Get the underlying session
    pub fn session(&self) -> &Arc<dyn Cli> {
        &self.session
    }

    /// Send the dialect's session preparation commands
    pub async fn prepare(&self) -> Result<()> {
        for command in self.dialect.prepare_session() {
            debug!(host = %self.hostname, command = %command, "Preparing session");
            self.session.execute_and_read(&command).await?;
        }
        Ok(())
    }

    /// Run a read command, reusing output cached in `ctx`
    pub async fn show(&self, command: &str, ctx: &ReadContext) -> Result<String> {
        if let Some(output) = ctx.cached(command) {
            trace!(host = %self.hostname, command = %command, "Using cached output");
            return Ok(output);
        }
        let output = self.show_uncached(command).await?;
        ctx.store(command, output.clone());
        Ok(output)
    }

    /// Run a read command without consulting the cache
    pub async fn show_uncached(&self, command: &str) -> Result<String> {
        debug!(host = %self.hostname, command = %command, "Reading device state");
        let raw = self
            .session
            .execute_and_read(command)
            .await
            .map_err(|e| Error::read_failed(command, e.to_string()))?;
        trace!(host = %self.hostname, output = %raw, "Raw device output");

        if let Some(line) = self.dialect.detect_error(&raw) {
            warn!(host = %self.hostname, command = %command, error = %line, "Device rejected read command");
            return Err(Error::read_failed(command, line));
        }
        Ok(clean_output(command, &raw))
    }

    /// Apply configuration lines as one block.
    ///
    /// The block is wrapped in the dialect's configuration mode and recorded
    /// in `ctx`. In check mode nothing is sent. Returns the device output.
    pub async fn apply(
        &self,
        path: &ConfigPath,
        lines: &[String],
        ctx: &WriteContext,
    ) -> Result<String> {
        let lines: Vec<String> = lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            trace!(host = %self.hostname, path = %path, "Nothing to apply");
            return Ok(String::new());
        }

        let block = self.dialect.wrap_config(&lines).join("\n");
        ctx.record(block.clone());
        if ctx.is_check_mode() {
            debug!(host = %self.hostname, path = %path, commands = %block, "Check mode, not sending");
            return Ok(String::new());
        }

        debug!(host = %self.hostname, path = %path, commands = %block, "Applying configuration");
        let output = self
            .session
            .execute_and_read(&block)
            .await
            .map_err(|e| Error::write_failed(path.to_string(), block.clone(), e.to_string()))?;
        trace!(host = %self.hostname, output = %output, "Raw device output");

        if let Some(line) = self.dialect.detect_error(&output) {
            let command = offending_command(&lines, &output, &line).unwrap_or(block);
            warn!(host = %self.hostname, path = %path, command = %command, error = %line, "Device rejected configuration");
            return Err(Error::write_failed(path.to_string(), command, output.trim()));
        }
        Ok(output)
    }
}

/// The configuration line echoed closest before the error line
fn offending_command(lines: &[String], output: &str, error_line: &str) -> Option<String> {
    let before: Vec<&str> = output
        .lines()
        .map(str::trim)
        .take_while(|l| *l != error_line)
        .collect();
    before
        .iter()
        .rev()
        .find_map(|echo| lines.iter().find(|cmd| echo.ends_with(cmd.as_str())))
        .cloned()
}

/// Strip the echoed command and trailing prompt lines from device output
pub fn clean_output(command: &str, output: &str) -> String {
    let mut lines: Vec<&str> = output.lines().collect();

    if let Some(first) = lines.first() {
        if !command.is_empty() && first.trim().ends_with(command.trim()) {
            lines.remove(0);
        }
    }

    while let Some(last) = lines.last() {
        let last = last.trim();
        let prompt = !last.contains(char::is_whitespace)
            && (last.ends_with('#') || last.ends_with('>'))
            && last.len() > 1;
        if last.is_empty() || prompt {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n")
}
