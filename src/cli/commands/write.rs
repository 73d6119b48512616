//! Write command
//!
//! Applies the change between a `before` and an `after` record at a path.
//! A missing `before` creates the node; a missing `after` deletes it.

use super::{load_data, CommandContext};
use anyhow::{bail, Result};
use clap::Parser;
use cli_units::diff::{generate_config_diff, Diff};
use cli_units::path::ConfigPath;
use cli_units::template::to_command_lines;
use cli_units::unit::WriteContext;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the write command
#[derive(Parser, Debug, Clone)]
pub struct WriteArgs {
    /// Configuration path, e.g. /interfaces/interface[name=Loopback0]/config
    pub path: ConfigPath,

    /// Current data (YAML or JSON); omit to create
    #[arg(long)]
    pub before: Option<PathBuf>,

    /// Desired data (YAML or JSON); omit to delete
    #[arg(long)]
    pub after: Option<PathBuf>,

    /// Record the commands without sending them
    #[arg(long)]
    pub check: bool,

    /// Show a diff of the data
    #[arg(long)]
    pub diff: bool,
}

/// Structured result of a write
#[derive(Debug, Serialize)]
struct WriteReport {
    path: String,
    check_mode: bool,
    commands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<Diff>,
}

impl WriteArgs {
    /// Execute the write command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if self.before.is_none() && self.after.is_none() {
            bail!("Nothing to write: pass --before, --after or both");
        }

        let before = self.before.as_deref().map(load_data).transpose()?;
        let after = self.after.as_deref().map(load_data).transpose()?;

        let device = ctx.device().await?;
        let write_ctx = if self.check {
            WriteContext::check()
        } else {
            WriteContext::new()
        };

        ctx.registry
            .write(
                &self.path,
                before.as_ref(),
                after.as_ref(),
                &device,
                &write_ctx,
            )
            .await?;
        device.session().close().await?;

        let commands: Vec<String> = write_ctx
            .sent()
            .iter()
            .flat_map(|block| to_command_lines(block))
            .collect();
        let diff = if self.diff {
            Some(data_diff(before.as_ref(), after.as_ref())?)
        } else {
            None
        };

        if ctx.output.is_structured() {
            ctx.output.value(&WriteReport {
                path: self.path.to_string(),
                check_mode: self.check,
                commands,
                diff,
            })?;
            return Ok(0);
        }

        if commands.is_empty() {
            ctx.output.info("No changes");
        } else {
            ctx.output.section(if self.check {
                "Commands (check mode, not sent)"
            } else {
                "Commands"
            });
            ctx.output.commands(&commands)?;
        }
        if let Some(diff) = &diff {
            ctx.output.section("Diff");
            ctx.output.diff(diff)?;
        }
        Ok(0)
    }
}

/// Line diff of the YAML renderings of two records
fn data_diff(before: Option<&Value>, after: Option<&Value>) -> Result<Diff> {
    let render = |value: Option<&Value>| -> Result<String> {
        Ok(match value {
            Some(v) => serde_yaml::to_string(v)?,
            None => String::new(),
        })
    };
    Ok(generate_config_diff(&render(before)?, &render(after)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_diff() {
        let before = json!({"name": "Loopback0", "mtu": 1500});
        let after = json!({"name": "Loopback0", "mtu": 9000});

        let diff = data_diff(Some(&before), Some(&after)).unwrap();
        assert_eq!(diff.additions, 1);
        assert_eq!(diff.deletions, 1);

        let created = data_diff(None, Some(&after)).unwrap();
        assert_eq!(created.deletions, 0);
        assert_eq!(created.additions, 2);
    }
}
