//! Observable session snapshot

use serde::{Deserialize, Serialize};

use crate::models::agent::AgentInfo;
use crate::models::compile::{Annotation, Marker};
use crate::models::port::PortDescriptor;
use crate::models::status::SessionStatus;

/// Read-only projection of the session published after every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    /// Counter of upload attempts started in this session
    pub attempt: u64,
    pub board_id: String,
    pub ports: Vec<PortDescriptor>,
    pub selected_port: Option<PortDescriptor>,
    pub annotations: Vec<Annotation>,
    pub markers: Vec<Marker>,
    pub agent: Option<AgentInfo>,
    /// Upload button / selector affordance
    pub controls_disabled: bool,
}
