//! # cli-units - CLI configuration translation
//!
//! cli-units translates between structured, path-addressed configuration
//! records and the literal text of vendor CLIs (Cisco IOS / IOS-XR, Juniper
//! Junos, Huawei VRP).
//!
//! ## Core Concepts
//!
//! - **Readers**: parse `show` / `display` output into records
//! - **Writers**: render record changes into configuration commands and send them
//! - **Translation units**: named bundles of readers and writers for one platform
//! - **Dialects**: how a platform enters configuration mode, commits and reports errors
//! - **Sessions**: the gateway that executes command text on a device
//!
//! ## Architecture Overview
//!
//! ```text
//!   config path + record
//!          │
//!          ▼
//! ┌─────────────────────┐     ┌──────────────────────┐
//! │    Unit Registry    │────▶│  Reader / Writer     │
//! │ (platform, schema)  │     │  (per vendor unit)   │
//! └─────────────────────┘     └──────────────────────┘
//!                                │              │
//!                   Output Parser│              │Command Renderer
//!                                ▼              ▼
//!                         ┌────────────────────────────┐
//!                         │ Device (dialect + session) │
//!                         └────────────────────────────┘
//!                                       │
//!                                       ▼
//!                              Session gateway (Cli)
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use cli_units::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = ReplayCli::from_file("fixtures/r1.yaml".as_ref())?;
//!     let device = Device::new(Arc::new(session), Platform::CiscoIos);
//!     let registry = UnitRegistry::with_builtins();
//!
//!     let path = ConfigPath::parse("/interfaces/interface[name=Loopback0]/config")?;
//!     let config = registry.read(&path, &device, &ReadContext::new()).await?;
//!     println!("{}", serde_json::to_string_pretty(&config)?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Errors
    pub use crate::error::{Error, ErrorContext, Result};

    // Sessions
    pub use crate::session::{Cli, ProcessCli, ReplayCli, SessionError, SessionResult};

    // Devices and platforms
    pub use crate::device::Device;
    pub use crate::path::ConfigPath;
    pub use crate::platform::{Dialect, Platform};

    // Rendering and parsing
    pub use crate::parser::{OutputParser, ParseRule, ParserSpec, Record};
    pub use crate::template::TemplateEngine;

    // Handler framework
    pub use crate::unit::{
        DynReader, DynWriter, HandlerRegistry, ListReader, ReadContext, Reader, TranslateUnit,
        UnitRegistry, WriteContext, Writer,
    };
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Session gateway: the boundary that executes command text on a device.
///
/// Provides the [`Cli`](session::Cli) trait plus a fixture-backed replay
/// session and an external-process session.
pub mod session;

/// Configuration tree paths.
pub mod path;

// ============================================================================
// Text Processing
// ============================================================================

/// Command Renderer: Jinja2-style command templates via minijinja.
pub mod template;

/// Output Parser: ordered regex extraction rules over command output.
pub mod parser;

/// Indented running-config trees.
pub mod config_tree;

/// Line diffs between configuration snapshots.
pub mod diff;

// ============================================================================
// Devices and Handlers
// ============================================================================

/// Platforms and their CLI dialects.
pub mod platform;

/// Device handle combining a session with a dialect.
pub mod device;

/// Handler traits, transaction contexts and registries.
pub mod unit;

/// Built-in vendor translation units.
pub mod units;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
