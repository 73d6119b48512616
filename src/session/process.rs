//! Process session module
//!
//! Runs each command through an external program. The program line is split
//! with shell rules and the command text is appended as the last argument,
//! so `vtysh -c` becomes `vtysh -c "<command>"`.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::{Cli, SessionError, SessionResult};

/// Default command timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Session backed by an external program
#[derive(Debug, Clone)]
pub struct ProcessCli {
    /// Identifier for this session
    identifier: String,
    /// Program to run
    program: String,
    /// Arguments placed before the command text
    args: Vec<String>,
    /// Timeout per command, in seconds
    timeout: u64,
}

impl ProcessCli {
    /// Create a process session from a program line such as `vtysh -c`
    pub fn new(identifier: impl Into<String>, program_line: &str) -> SessionResult<Self> {
        let mut words = shell_words::split(program_line)
            .map_err(|e| SessionError::InvalidConfig(format!("Invalid program line: {}", e)))?;
        if words.is_empty() {
            return Err(SessionError::InvalidConfig(
                "Program line must not be empty".to_string(),
            ));
        }
        let program = words.remove(0);

        Ok(Self {
            identifier: identifier.into(),
            program,
            args: words,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the per-command timeout
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program and leading arguments
    pub fn program(&self) -> (&str, &[String]) {
        (&self.program, &self.args)
    }

    fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Cli for ProcessCli {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute_and_read(&self, command: &str) -> SessionResult<String> {
        debug!(program = %self.program, command = %command, "Executing device command");

        let child = self.build_command(command).spawn().map_err(|e| {
            SessionError::ExecutionFailed(format!("Failed to spawn '{}': {}", self.program, e))
        })?;

        let timeout = tokio::time::Duration::from_secs(self.timeout);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| {
                SessionError::ExecutionFailed(format!("Failed to wait for process: {}", e))
            })?,
            // Dropping the wait future kills the child
            Err(_) => {
                warn!(program = %self.program, timeout = self.timeout, "Command timed out, killed");
                return Err(SessionError::Timeout(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        trace!(
            exit_code = ?output.status.code(),
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Command completed"
        );

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(SessionError::ExecutionFailed(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )))
        }
    }
}
