//! Logging initialization for sketchbridge

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Timestamped, human-readable lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Map the `-q`/`-v` flags to a level filter
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize stderr logging for the CLI. `RUST_LOG` refines the filter.
pub fn init_cli_logging(verbose: u8, quiet: bool, format: LogFormat) -> Result<()> {
    let level = level_for(verbose, quiet);

    let mut builder = Builder::from_default_env();
    builder.target(Target::Stderr).filter_level(level);

    match format {
        LogFormat::Human => {
            builder.format_timestamp_secs().format_module_path(false);
        }
        LogFormat::Json => {
            builder.format(|buf, record| {
                let json = serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "level": record.level().to_string(),
                    "module": record.module_path().unwrap_or("unknown"),
                    "message": record.args().to_string(),
                });
                writeln!(buf, "{}", json)
            });
        }
    }

    builder.try_init()?;

    // Panics inside spawned session tasks would otherwise only reach stderr
    log_panics::init();

    log::debug!("sketchbridge logging initialized with level: {:?}", level);
    Ok(())
}
