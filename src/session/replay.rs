//! Replay session module
//!
//! Answers commands from a fixture map of captured device output. Useful for
//! offline translation, tests, and dry runs against saved `show` output.

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

use super::{normalize_command, Cli, SessionError, SessionResult};

/// On-disk fixture format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFixtures {
    /// Device hostname reported as the session identifier
    #[serde(default)]
    pub hostname: Option<String>,
    /// Captured output per command
    #[serde(default)]
    pub responses: IndexMap<String, String>,
}

/// Session answering commands from captured output
#[derive(Debug)]
pub struct ReplayCli {
    /// Identifier for this session
    identifier: String,
    /// Output per normalized command
    responses: IndexMap<String, String>,
    /// Every line sent, in order
    history: RwLock<Vec<String>>,
}

impl ReplayCli {
    /// Create an empty replay session
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            responses: IndexMap::new(),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Add a canned response
    pub fn with_response(mut self, command: &str, output: impl Into<String>) -> Self {
        self.responses.insert(normalize_command(command), output.into());
        self
    }

    /// Build a session from parsed fixtures
    pub fn from_fixtures(fixtures: ReplayFixtures) -> Self {
        let identifier = fixtures.hostname.unwrap_or_else(|| "replay".to_string());
        let responses = fixtures
            .responses
            .into_iter()
            .map(|(cmd, out)| (normalize_command(&cmd), out))
            .collect();
        Self {
            identifier,
            responses,
            history: RwLock::new(Vec::new()),
        }
    }

    /// Load fixtures from a YAML or JSON file
    pub fn from_file(path: &Path) -> SessionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixtures: ReplayFixtures = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SessionError::InvalidConfig(format!("{}: {}", path.display(), e)))?,
            _ => serde_yaml::from_str(&content)
                .map_err(|e| SessionError::InvalidConfig(format!("{}: {}", path.display(), e)))?,
        };
        debug!(
            path = %path.display(),
            responses = fixtures.responses.len(),
            "Loaded replay fixtures"
        );
        Ok(Self::from_fixtures(fixtures))
    }

    /// All lines sent to this session
    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    /// Forget the recorded history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    fn answer_line(&self, line: &str) -> SessionResult<String> {
        let key = normalize_command(line);
        if let Some(output) = self.responses.get(&key) {
            return Ok(output.clone());
        }
        if is_read_command(&key) {
            Err(SessionError::UnknownCommand(key))
        } else {
            // Configuration lines are accepted silently.
            Ok(String::new())
        }
    }
}

/// Whether a line reads device state rather than changing it
fn is_read_command(line: &str) -> bool {
    line.starts_with("show ") || line.starts_with("display ") || line.contains(" | ")
}

#[async_trait]
impl Cli for ReplayCli {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute_and_read(&self, command: &str) -> SessionResult<String> {
        let whole = normalize_command(command);
        self.history.write().push(command.to_string());

        // A multi-line block may have been captured as a single response.
        if let Some(output) = self.responses.get(&whole) {
            trace!(command = %whole, "Replaying captured output");
            return Ok(output.clone());
        }

        let mut output = String::new();
        for line in command.lines().filter(|l| !l.trim().is_empty()) {
            let answer = self.answer_line(line)?;
            if !answer.is_empty() {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&answer);
            }
        }
        Ok(output)
    }
}
