//! Shared test utilities for the cli-units test suite.
//!
//! This module provides:
//! - A mock session with canned responses and a command log
//! - Device and registry helpers
//! - Captured device output used across vendor tests
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use cli_units::device::Device;
use cli_units::path::ConfigPath;
use cli_units::platform::Platform;
use cli_units::session::{Cli, SessionError, SessionResult};

// ============================================================================
// Mock Session Implementation
// ============================================================================

/// A mock session for testing handlers without a device.
///
/// Read commands are answered from canned responses. Configuration blocks
/// are answered line by line: a line registered with [`MockCli::reject`]
/// is echoed followed by the given error text, every other line is
/// accepted silently.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockCli::new("r1");
/// mock.set_response("show version", "Cisco IOS 15.2");
///
/// let output = mock.execute_and_read("show version").await.unwrap();
/// assert_eq!(mock.command_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockCli {
    identifier: String,
    responses: RwLock<HashMap<String, String>>,
    rejections: RwLock<HashMap<String, String>>,
    commands: RwLock<Vec<String>>,
    should_fail: AtomicBool,
}

impl MockCli {
    /// Create a new mock session with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Set the output for a specific command.
    pub fn set_response(&self, command: impl Into<String>, output: impl Into<String>) {
        self.responses.write().insert(command.into(), output.into());
    }

    /// Make the device reject a configuration line with `error` text.
    pub fn reject(&self, line: impl Into<String>, error: impl Into<String>) {
        self.rejections.write().insert(line.into(), error.into());
    }

    /// Configure the mock to fail all commands.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Get the number of commands executed.
    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// Get all commands sent, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.read().clone()
    }

    /// Commands sent after the session preparation commands.
    pub fn commands_after_prepare(&self, platform: Platform) -> Vec<String> {
        let skip = platform.dialect().prepare_session().len();
        self.commands().into_iter().skip(skip).collect()
    }

    /// Clear the command log.
    pub fn clear_commands(&self) {
        self.commands.write().clear();
    }
}

#[async_trait]
impl Cli for MockCli {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute_and_read(&self, command: &str) -> SessionResult<String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SessionError::ExecutionFailed(
                "Mock session failed".to_string(),
            ));
        }

        self.commands.write().push(command.to_string());

        if let Some(output) = self.responses.read().get(command.trim()) {
            return Ok(output.clone());
        }

        let rejections = self.rejections.read();
        let mut output = String::new();
        for line in command.lines() {
            if let Some(error) = rejections.get(line.trim()) {
                output.push_str(&format!("R1(config-if)#{}\n{}\n", line.trim(), error));
            }
        }
        Ok(output)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Build a device over a shared mock session.
pub fn device(mock: &Arc<MockCli>, platform: Platform) -> Device {
    Device::new(mock.clone(), platform)
}

/// Parse a path, panicking on invalid test input.
pub fn path(text: &str) -> ConfigPath {
    ConfigPath::parse(text).expect("valid test path")
}

/// Interface configuration path for `name`.
pub fn interface_path(name: &str) -> ConfigPath {
    path(&format!("/interfaces/interface[name={}]/config", name))
}

// ============================================================================
// Captured Output
// ============================================================================

pub const IOS_INTERFACE_LIST: &str = "\
interface Loopback0
interface GigabitEthernet0/1
interface GigabitEthernet0/2
";

pub const IOS_GI01: &str = "\
Building configuration...

Current configuration : 201 bytes
!
interface GigabitEthernet0/1
 description uplink to core
 mtu 9000
 ip address 10.187.100.49 255.255.255.240
 ip address 10.0.0.1 255.255.255.0 secondary
 shutdown
end
";

pub const IOS_LOOPBACK0: &str = "\
Building configuration...

Current configuration : 72 bytes
!
interface Loopback0
 ip address 192.0.2.1 255.255.255.255
end
";

pub const IOS_BGP: &str = "\
router bgp 65000
 bgp router-id 192.0.2.1
 bgp log-neighbor-changes
 neighbor 10.0.0.2 remote-as 65001
";
