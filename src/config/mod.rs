//! Configuration management for sketchbridge

pub mod app_config;
pub mod board_catalog;

pub use app_config::*;
pub use board_catalog::*;
