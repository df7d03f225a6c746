//! Command line interface
//!
//! Argument parsing and the command implementations built on the session
//! services.

pub mod args;
pub mod commands;

pub use args::*;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::utils::logging::init_cli_logging;

/// Main CLI application runner
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_cli_logging(cli.verbose, cli.quiet, cli.log_format)?;

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.secure {
        config.agent.secure = true;
    }
    config.validate()?;

    commands::execute_command(cli.command.clone(), &config).await
}
