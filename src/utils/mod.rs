//! Utility functions and helpers used throughout sketchbridge

pub mod logging;

pub use logging::{LogFormat, init_cli_logging};
