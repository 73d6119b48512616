//! Read and list commands

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use cli_units::path::ConfigPath;
use cli_units::unit::ReadContext;
use serde_json::Value;

/// Arguments for the read command
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    /// Configuration path, e.g. /interfaces/interface[name=Loopback0]/config
    pub path: ConfigPath,
}

impl ReadArgs {
    /// Execute the read command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let device = ctx.device().await?;
        let read_ctx = ReadContext::new();

        let value = ctx.registry.read(&self.path, &device, &read_ctx).await?;
        device.session().close().await?;

        match value {
            Some(value) => ctx.output.value(&value)?,
            None if ctx.output.is_structured() => ctx.output.value(&Value::Null)?,
            None => ctx
                .output
                .warning(&format!("Nothing configured at {}", self.path)),
        }
        Ok(0)
    }
}

/// Arguments for the list command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Path of a list node, e.g. /interfaces/interface
    pub path: ConfigPath,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let device = ctx.device().await?;
        let read_ctx = ReadContext::new();

        let entries = ctx.registry.list(&self.path, &device, &read_ctx).await?;
        device.session().close().await?;

        let paths: Vec<String> = entries.iter().map(ToString::to_string).collect();
        if ctx.output.is_structured() {
            ctx.output.value(&paths)?;
        } else {
            for path in &paths {
                println!("{}", path);
            }
        }
        Ok(0)
    }
}
