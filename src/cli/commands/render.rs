//! Render command
//!
//! Renders a command template against variables from a file and from
//! `--set` pairs, printing one device command per line.

use super::{load_data, CommandContext};
use anyhow::{bail, Context, Result};
use clap::Parser;
use cli_units::template::TemplateEngine;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Arguments for the render command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Template text, or @FILE to read it from a file
    pub template: String,

    /// Variables file (YAML or JSON object)
    #[arg(long)]
    pub vars: Option<PathBuf>,

    /// Set a variable (key=value, value parsed as YAML)
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub set: Vec<String>,
}

impl RenderArgs {
    /// Execute the render command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let source = match self.template.strip_prefix('@') {
            Some(file) => std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read template {}", file))?,
            None => self.template.clone(),
        };

        let vars = self.variables()?;
        ctx.output
            .debug(&format!("Rendering with {} variable(s)", vars.len()));

        let commands = TemplateEngine::new().render_commands(&source, &vars)?;
        ctx.output.commands(&commands)?;
        Ok(0)
    }

    /// Variables from the file, then `--set` pairs on top
    fn variables(&self) -> Result<Map<String, Value>> {
        let mut vars = match &self.vars {
            Some(path) => match load_data(path)? {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                _ => bail!("Variables file {} must hold a mapping", path.display()),
            },
            None => Map::new(),
        };

        for pair in &self.set {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("Invalid --set '{}': expected key=value", pair);
            };
            let parsed: Value = serde_yaml::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            vars.insert(key.trim().to_string(), parsed);
        }

        Ok(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(set: &[&str]) -> RenderArgs {
        RenderArgs {
            template: "interface {{ name }}".to_string(),
            vars: None,
            set: set.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_set_values_are_yaml() {
        let vars = args(&["name=Loopback0", "mtu=1500", "enabled=false"])
            .variables()
            .unwrap();
        assert_eq!(vars["name"], json!("Loopback0"));
        assert_eq!(vars["mtu"], json!(1500));
        assert_eq!(vars["enabled"], json!(false));
    }

    #[test]
    fn test_set_without_equals() {
        assert!(args(&["name"]).variables().is_err());
    }
}
