//! Data models and types used throughout sketchbridge

pub mod agent;
pub mod board;
pub mod compile;
pub mod events;
pub mod port;
pub mod session;
pub mod status;
pub mod upload;

// Re-export commonly used types
pub use agent::*;
pub use board::*;
pub use compile::*;
pub use events::*;
pub use port::*;
pub use session::*;
pub use status::*;
pub use upload::*;
