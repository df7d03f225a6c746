//! Command line argument parsing

use crate::utils::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(name = "sketchbridge")]
#[command(about = "🔌 Compile sketches remotely and flash them through the local device agent")]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log record format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub log_format: LogFormat,

    /// Talk to the agent over https/wss
    #[arg(long, global = true)]
    pub secure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// List the board catalog
    Boards,
    /// Scan for the device agent and print its endpoints
    Locate,
    /// Print the serial ports reported by the agent
    Ports {
        /// Seconds to wait for the first port list
        #[arg(short, long, default_value = "5")]
        wait: u64,
    },
    /// Compile a sketch and flash it to a board
    Upload {
        /// Sketch source file
        sketch: PathBuf,
        /// Board id, e.g. arduino:avr:uno
        #[arg(short, long)]
        board: Option<String>,
        /// Serial port name (defaults to the first port the agent reports)
        #[arg(short, long)]
        port: Option<String>,
        /// Compile server base URL
        #[arg(long)]
        compile_url: Option<String>,
        /// Seconds to wait for the agent and its port list
        #[arg(long, default_value = "10")]
        wait: u64,
        /// Give up if the session has not finished after this many seconds
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
