//! cli-units - CLI configuration translation
//!
//! This is the main entry point for the cli-units CLI.

mod cli;
mod config;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use config::{Config, LogFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            if cli.verbosity() >= 1 {
                eprintln!("Warning: Failed to load config: {}", e);
            }
            Config::default()
        }
    };

    // Initialize logging based on verbosity and config
    init_logging(cli.verbosity(), &config);

    if cli.verbosity() >= 2 {
        tracing::debug!("cli-units v{}", VERSION);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let result = match &cli.command {
        Commands::Render(args) => args.execute(&mut ctx).await,
        Commands::Parse(args) => args.execute(&mut ctx).await,
        Commands::Read(args) => args.execute(&mut ctx).await,
        Commands::List(args) => args.execute(&mut ctx).await,
        Commands::Write(args) => args.execute(&mut ctx).await,
        Commands::Units(args) => args.execute(&mut ctx).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            e.downcast_ref::<cli_units::error::Error>()
                .map_or(1, cli_units::error::Error::exit_code)
        }
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8, config: &Config) {
    let filter = match verbosity {
        0 => config.logging.level.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output stays parseable
    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init(),
    }
}
