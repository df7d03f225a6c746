//! Error handling for sketchbridge

pub mod types;

pub use types::*;
