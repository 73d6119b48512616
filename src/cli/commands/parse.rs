//! Parse command
//!
//! Applies a declarative rules file to captured command output.

use super::CommandContext;
use anyhow::{Context, Result};
use clap::Parser;
use cli_units::parser::ParserSpec;
use std::path::PathBuf;

/// Arguments for the parse command
#[derive(Parser, Debug, Clone)]
pub struct ParseArgs {
    /// Rules file (YAML or JSON)
    pub rules: PathBuf,

    /// Captured output file
    #[arg(id = "output_file", value_name = "OUTPUT")]
    pub output: PathBuf,
}

impl ParseArgs {
    /// Execute the parse command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let spec = ParserSpec::from_file(&self.rules)?;
        let text = std::fs::read_to_string(&self.output)
            .with_context(|| format!("Failed to read {}", self.output.display()))?;

        ctx.output.debug(&format!(
            "Applying {} rule(s) from {}",
            spec.rules.len(),
            self.rules.display()
        ));

        let record = spec.apply(&text)?;
        ctx.output.value(&record)?;
        Ok(0)
    }
}
