//! Error types for cli-units.
//!
//! This module defines the error types used by readers, writers, the command
//! renderer and the output parser. Device-facing failures carry the command
//! text and the raw device output so the caller can see what went wrong.

use crate::session::SessionError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cli-units operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for cli-units.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Read/Write Errors
    // ========================================================================
    /// Reading device state failed.
    #[error("Failed to read '{path}': {message}")]
    ReadFailed {
        /// Config path (or command) being read
        path: String,
        /// Error message
        message: String,
    },

    /// The device rejected (or failed to execute) a configuration block.
    #[error("Failed to write '{path}': device rejected '{command}': {output}")]
    WriteFailed {
        /// Config path being written
        path: String,
        /// Offending command line (or the whole block)
        command: String,
        /// Device output explaining the failure
        output: String,
    },

    /// A field required to render a command is missing.
    #[error("Missing required field '{field}' for '{path}'")]
    MissingField {
        /// Config path being written
        path: String,
        /// Field name
        field: String,
    },

    /// An argument (path, key, operation) is not acceptable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Structured data could not be converted into a handler's record type.
    #[error("Invalid data for '{path}': {message}")]
    InvalidData {
        /// Config path
        path: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// No handler registered for the platform/path pair.
    #[error("No {kind} registered for '{path}' on platform '{platform}'")]
    HandlerNotFound {
        /// Handler kind (reader, list reader, writer)
        kind: &'static str,
        /// Schema path
        path: String,
        /// Platform name
        platform: String,
    },

    // ========================================================================
    // Template Errors
    // ========================================================================
    /// Template syntax error.
    #[error("Template syntax error in '{template}': {message}")]
    TemplateSyntax {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Template rendering failed for '{template}': {message}")]
    TemplateRender {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Low-level template engine error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    // ========================================================================
    // Parser Errors
    // ========================================================================
    /// A parse rule could not be compiled.
    #[error("Invalid parse rule '{rule}': {message}")]
    InvalidRule {
        /// Rule (field) name
        rule: String,
        /// Error message
        message: String,
    },

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Device output did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Error raised by the session gateway.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // ========================================================================
    // IO and Serialization Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new read failed error.
    pub fn read_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new write failed error.
    pub fn write_failed(
        path: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::WriteFailed {
            path: path.into(),
            command: command.into(),
            output: output.into(),
        }
    }

    /// Creates a new missing field error.
    pub fn missing_field(path: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            path: path.into(),
            field: field.into(),
        }
    }

    /// Creates a new invalid data error.
    pub fn invalid_data(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new template render error.
    pub fn template_render(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateRender {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Returns true if the device itself refused the operation.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Error::WriteFailed { .. } | Error::ReadFailed { .. })
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::WriteFailed { .. } | Error::ReadFailed { .. } => 2,
            Error::Session(_) => 3,
            Error::MissingField { .. } | Error::InvalidArgument(_) | Error::InvalidData { .. } => 4,
            Error::HandlerNotFound { .. } => 5,
            Error::TemplateSyntax { .. }
            | Error::TemplateRender { .. }
            | Error::Template(_)
            | Error::InvalidRule { .. }
            | Error::Regex(_) => 6,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}
