//! Output formatting module for cli-units
//!
//! Prints records, command blocks and diffs in human, JSON or YAML form.

use super::OutputFormat;
use anyhow::Result;
use cli_units::diff::Diff;
use colored::Colorize;
use serde::Serialize;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Output format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    /// Whether machine-readable output was requested
    pub fn is_structured(&self) -> bool {
        !matches!(self.format, OutputFormat::Human)
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.is_structured() {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print a serializable value in the selected format
    pub fn value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml | OutputFormat::Human => {
                print!("{}", serde_yaml::to_string(value)?);
            }
        }
        Ok(())
    }

    /// Print device command lines, one per line
    pub fn commands(&self, lines: &[String]) -> Result<()> {
        if self.is_structured() {
            return self.value(&lines);
        }

        for line in lines {
            if self.use_color {
                println!("{}", line.bright_white());
            } else {
                println!("{}", line);
            }
        }
        Ok(())
    }

    /// Print a line diff
    pub fn diff(&self, diff: &Diff) -> Result<()> {
        if self.is_structured() {
            return self.value(diff);
        }

        if !diff.has_changes() {
            self.info("No changes");
            return Ok(());
        }

        if let Some(details) = &diff.details {
            for line in details.lines() {
                if !self.use_color {
                    println!("{}", line);
                } else if line.starts_with('+') {
                    println!("{}", line.green());
                } else if line.starts_with('-') {
                    println!("{}", line.red());
                } else {
                    println!("{}", line.bright_black());
                }
            }
        }

        let summary = format!("{} additions, {} deletions", diff.additions, diff.deletions);
        if self.use_color {
            println!("{}", summary.bright_black());
        } else {
            println!("{}", summary);
        }
        Ok(())
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.is_structured() {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", err);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.is_structured() {
            let warn = serde_json::json!({
                "type": "warning",
                "message": message
            });
            eprintln!("{}", warn);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (human output only)
    pub fn info(&self, message: &str) {
        if self.is_structured() {
            return;
        }

        if self.use_color {
            println!("{}", message.green());
        } else {
            println!("{}", message);
        }
    }

    /// Print a debug message (respects verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 || self.is_structured() {
            return;
        }

        if self.use_color {
            eprintln!("{}", message.bright_black());
        } else {
            eprintln!("{}", message);
        }
    }
}
