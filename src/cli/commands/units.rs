//! Units command

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use cli_units::unit::HandlerInfo;
use colored::Colorize;
use serde::Serialize;

/// Arguments for the units command
#[derive(Parser, Debug, Clone)]
pub struct UnitsArgs {
    /// Show handler paths for each unit
    #[arg(short = 'l', long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct UnitSummary {
    name: String,
    platform: String,
    handlers: Vec<HandlerInfo>,
}

impl UnitsArgs {
    /// Execute the units command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let summaries: Vec<UnitSummary> = ctx
            .registry
            .units()
            .iter()
            .filter(|u| ctx.platform_flag.map_or(true, |p| u.platform() == p))
            .map(|u| UnitSummary {
                name: u.name().to_string(),
                platform: u.platform().to_string(),
                handlers: u.handlers().handlers(),
            })
            .collect();

        if ctx.output.is_structured() {
            ctx.output.value(&summaries)?;
            return Ok(0);
        }

        for unit in &summaries {
            println!("{:<20} {}", unit.name.bold(), unit.platform.cyan());
            if self.long {
                for handler in &unit.handlers {
                    println!("    {} [{}]", handler.path, handler.kinds.join(", "));
                }
            }
        }
        Ok(0)
    }
}
