//! Session events and the commands the state machine emits

use crate::models::agent::{AgentEvent, AgentInfo};
use crate::models::board::BoardDescriptor;
use crate::models::compile::{CompileResult, JobRef};
use crate::models::port::PortDescriptor;

/// Inputs to the session state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    // Editor and selector input
    SourceEdited(String),
    BoardSelected(BoardDescriptor),
    PortSelected(String),
    UploadRequested,

    // Compile backend
    CompileSubmitted { attempt: u64, job: JobRef },
    CompileSubmitFailed { attempt: u64, reason: String },
    CompileFinished { attempt: u64, result: CompileResult },
    CompilePollFailed { attempt: u64, reason: String },

    // Agent
    AgentReady(AgentInfo),
    AgentUnavailable(String),
    Agent(AgentEvent),
    ChannelClosed(String),
    UploadTimedOut { attempt: u64 },
}

/// Side effects requested by a transition, executed by the session runner
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SubmitCompile {
        attempt: u64,
        script: String,
        board_id: String,
    },
    PollJob {
        attempt: u64,
        job: JobRef,
    },
    /// Hand the artifact to the upload driver and arm the timeout
    Upload {
        attempt: u64,
        artifact: String,
        board: BoardDescriptor,
        port: Option<PortDescriptor>,
    },
    CancelUploadTimeout,
}
