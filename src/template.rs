//! Command template rendering.
//!
//! Writers describe the CLI text they send as Jinja2-style templates rendered
//! with minijinja. The engine adds a few helpers that come up over and over in
//! device configuration:
//!
//! - `update(before, after, cmd, nocmd)`: emit `cmd` when a field was set or
//!   changed, `nocmd` when it was removed, nothing when it is unchanged
//! - `netmask` / `prefix_len` / `wildcard`: IPv4 mask conversions
//! - `quote`: double-quote values that contain whitespace
//!
//! ```rust,ignore
//! let engine = TemplateEngine::new();
//! let lines = engine.render_commands(
//!     "interface {{ data.name }}\n{{ update(before.mtu, data.mtu, 'mtu ' ~ data.mtu, 'no mtu') }}",
//!     &serde_json::json!({ "data": { "name": "Gi0/1", "mtu": 1500 } }),
//! )?;
//! assert_eq!(lines, vec!["interface Gi0/1", "mtu 1500"]);
//! ```

use crate::error::{Error, Result};
use crate::units::model::{netmask_from_prefix, prefix_from_netmask, wildcard_from_prefix};
use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;
use tracing::trace;

/// Name used for ad-hoc template strings in error messages
const INLINE_TEMPLATE: &str = "<inline>";

/// Jinja2-compatible renderer for CLI command templates
#[derive(Debug)]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create an engine with the command helpers registered
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // Optional fields are routinely absent; `before.mtu` must not fail
        // when there is no `before`.
        env.set_undefined_behavior(UndefinedBehavior::Chainable);

        env.add_function("update", update);
        env.add_filter("netmask", netmask);
        env.add_filter("prefix_len", prefix_len);
        env.add_filter("wildcard", wildcard);
        env.add_filter("quote", quote);

        Self { env }
    }

    /// Check whether a string contains template syntax
    pub fn is_template(text: &str) -> bool {
        text.contains("{{") || text.contains("{%")
    }

    /// Register a named template, compiled once
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| syntax_error(name, e))
    }

    /// Render an ad-hoc template string
    pub fn render<S: Serialize>(&self, template: &str, vars: &S) -> Result<String> {
        self.env
            .render_str(template, vars)
            .map_err(|e| classify(INLINE_TEMPLATE, e))
    }

    /// Render a registered template
    pub fn render_named<S: Serialize>(&self, name: &str, vars: &S) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| Error::template_render(name, e.to_string()))?;
        template.render(vars).map_err(|e| classify(name, e))
    }

    /// Render an ad-hoc template and split it into command lines
    pub fn render_commands<S: Serialize>(&self, template: &str, vars: &S) -> Result<Vec<String>> {
        let rendered = self.render(template, vars)?;
        Ok(to_command_lines(&rendered))
    }

    /// Render a registered template and split it into command lines
    pub fn render_named_commands<S: Serialize>(&self, name: &str, vars: &S) -> Result<Vec<String>> {
        let rendered = self.render_named(name, vars)?;
        trace!(template = name, rendered = %rendered, "Rendered command template");
        Ok(to_command_lines(&rendered))
    }

    /// Names of all registered templates
    pub fn template_names(&self) -> Vec<String> {
        self.env
            .templates()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Split rendered text into trimmed, non-empty command lines
pub fn to_command_lines(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn syntax_error(template: &str, e: minijinja::Error) -> Error {
    Error::TemplateSyntax {
        template: template.to_string(),
        message: e.to_string(),
    }
}

fn classify(template: &str, e: minijinja::Error) -> Error {
    match e.kind() {
        ErrorKind::SyntaxError => syntax_error(template, e),
        _ => Error::template_render(template, e.to_string()),
    }
}

fn is_unset(value: &Value) -> bool {
    value.is_undefined() || value.is_none()
}

/// `update(before, after, cmd, nocmd)`
fn update(before: Value, after: Value, cmd: String, nocmd: String) -> String {
    match (is_unset(&before), is_unset(&after)) {
        (_, false) if before != after => cmd,
        (false, true) => nocmd,
        _ => String::new(),
    }
}

fn netmask(prefix: u32) -> std::result::Result<String, minijinja::Error> {
    netmask_from_prefix(prefix)
        .map(|m| m.to_string())
        .ok_or_else(|| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid prefix length {}", prefix),
            )
        })
}

fn wildcard(prefix: u32) -> std::result::Result<String, minijinja::Error> {
    wildcard_from_prefix(prefix)
        .map(|m| m.to_string())
        .ok_or_else(|| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid prefix length {}", prefix),
            )
        })
}

fn prefix_len(mask: String) -> std::result::Result<u32, minijinja::Error> {
    prefix_from_netmask(&mask).ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid netmask '{}'", mask),
        )
    })
}

fn quote(value: String) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value
    }
}
