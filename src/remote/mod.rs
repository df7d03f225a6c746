//! Remote endpoints: the local device agent and the compile backend
//!
//! This module provides the client side of every network contract the
//! session depends on.

pub mod agent_client;
pub mod channel;
pub mod compile_client;
pub mod locator;
pub mod socketio;

pub use agent_client::{AgentUploader, HttpAgentClient};
pub use channel::{AgentChannel, ChannelSettings};
pub use compile_client::{CompileBackend, HttpCompileBackend};
pub use locator::{LocatorSettings, locate_agent};
