//! sketchbridge - Remote compile and local flash orchestration
//!
//! A session takes sketch source, compiles it on a remote compile backend
//! and hands the resulting artifact to a device agent running on the local
//! machine, which flashes it to the selected serial port. The agent is found
//! by scanning a fixed localhost port range; its event channel reports the
//! available ports and the outcome of each flash.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod remote;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;
pub use services::{SessionHandle, SessionRunner, SessionSettings};

/// sketchbridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// sketchbridge application name
pub const APP_NAME: &str = "sketchbridge";
