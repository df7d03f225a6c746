//! Session state machine
//!
//! One [`SessionState`] value holds the authoritative status and the data
//! the UI reflects. [`SessionState::apply`] is a pure transition: it takes
//! the state by value, returns the next state and the side effects the
//! runner must execute. No I/O happens here.
//!
//! Per upload attempt the status only moves forward:
//! `Ready → SendingToServer → Compiling → CompileError` or
//! `Compiling → Uploading → Done | UploadError`.

use crate::models::agent::{AgentEvent, AgentInfo};
use crate::models::board::BoardDescriptor;
use crate::models::compile::{Annotation, CompileResult, Marker};
use crate::models::events::{SessionCommand, SessionEvent};
use crate::models::port::PortSelection;
use crate::models::session::SessionSnapshot;
use crate::models::status::SessionStatus;
use crate::services::port_reconciler::reconcile;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    status: SessionStatus,
    attempt: u64,
    source: String,
    board: BoardDescriptor,
    ports: PortSelection,
    annotations: Vec<Annotation>,
    markers: Vec<Marker>,
    agent: Option<AgentInfo>,
}

/// Result of applying one event
#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub commands: Vec<SessionCommand>,
}

impl SessionState {
    pub fn new(board: BoardDescriptor, source: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Ready,
            attempt: 0,
            source: source.into(),
            board,
            ports: PortSelection::default(),
            annotations: Vec::new(),
            markers: Vec::new(),
            agent: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn board(&self) -> &BoardDescriptor {
        &self.board
    }

    pub fn ports(&self) -> &PortSelection {
        &self.ports
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn agent(&self) -> Option<&AgentInfo> {
        self.agent.as_ref()
    }

    /// Upload and selection controls are disabled while busy
    pub fn check_disabled(&self) -> bool {
        self.status.is_busy()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            attempt: self.attempt,
            board_id: self.board.id.clone(),
            ports: self.ports.options.clone(),
            selected_port: self.ports.selected.clone(),
            annotations: self.annotations.clone(),
            markers: self.markers.clone(),
            agent: self.agent.clone(),
            controls_disabled: self.check_disabled(),
        }
    }

    /// Apply one event
    pub fn apply(mut self, event: SessionEvent) -> Transition {
        let mut commands = Vec::new();

        match event {
            SessionEvent::SourceEdited(source) => {
                self.source = source;
                self.annotations.clear();
                self.markers.clear();
            }

            SessionEvent::BoardSelected(board) => {
                if self.check_disabled() {
                    log::warn!("Board change to {} ignored while {}", board.id, self.status);
                } else {
                    log::debug!("Board selected: {}", board.id);
                    self.board = board;
                }
            }

            SessionEvent::PortSelected(id) => {
                if self.check_disabled() {
                    log::warn!("Port change to {} ignored while {}", id, self.status);
                } else if !self.ports.select(&id) {
                    log::warn!("Port {} is not in the current port list", id);
                }
            }

            SessionEvent::UploadRequested => {
                if self.check_disabled() {
                    log::warn!("Upload request ignored while {}", self.status);
                } else {
                    self.attempt += 1;
                    self.set_status(SessionStatus::SendingToServer);
                    commands.push(SessionCommand::SubmitCompile {
                        attempt: self.attempt,
                        script: self.source.clone(),
                        board_id: self.board.id.clone(),
                    });
                }
            }

            SessionEvent::CompileSubmitted { attempt, job } => {
                if self.is_current(attempt, SessionStatus::SendingToServer) {
                    self.set_status(SessionStatus::Compiling);
                    commands.push(SessionCommand::PollJob { attempt, job });
                }
            }

            SessionEvent::CompileSubmitFailed { attempt, reason } => {
                // Status stays at SendingToServer: there is no recovery path
                log::error!("❌ Compile submission failed (attempt {}): {}", attempt, reason);
            }

            SessionEvent::CompileFinished { attempt, result } => {
                if self.is_current(attempt, SessionStatus::Compiling) {
                    match result {
                        CompileResult::Artifact(artifact) => {
                            self.set_status(SessionStatus::Uploading);
                            commands.push(SessionCommand::Upload {
                                attempt,
                                artifact,
                                board: self.board.clone(),
                                port: self.ports.selected.clone(),
                            });
                        }
                        CompileResult::Failed(diagnostic) => {
                            log::info!(
                                "Compile error at line {}: {}",
                                diagnostic.line_number,
                                diagnostic.error
                            );
                            self.annotations = vec![diagnostic.annotation()];
                            self.markers = vec![diagnostic.marker()];
                            self.set_status(SessionStatus::CompileError);
                        }
                    }
                }
            }

            SessionEvent::CompilePollFailed { attempt, reason } => {
                // Status stays at Compiling: polling is fail-stop
                log::error!("❌ Compile status poll failed (attempt {}): {}", attempt, reason);
            }

            SessionEvent::AgentReady(info) => {
                self.agent = Some(info);
            }

            SessionEvent::AgentUnavailable(reason) => {
                log::error!("❌ Couldn't find the device agent: {}", reason);
            }

            SessionEvent::ChannelClosed(reason) => {
                log::warn!("Agent channel is gone ({}); port list will not refresh", reason);
            }

            SessionEvent::Agent(AgentEvent::PortList(raw_ports)) => {
                self.ports = reconcile(self.ports.selected.as_ref(), &raw_ports);
            }

            SessionEvent::Agent(AgentEvent::FlashSucceeded) => {
                if self.status == SessionStatus::Uploading {
                    self.set_status(SessionStatus::Done);
                    commands.push(SessionCommand::CancelUploadTimeout);
                } else {
                    log::debug!("Ignoring flash success while {}", self.status);
                }
            }

            SessionEvent::Agent(AgentEvent::FlashFailed(message)) => {
                if self.status == SessionStatus::Uploading {
                    log::error!("❌ Agent reported: {}", message);
                    self.set_status(SessionStatus::UploadError);
                    commands.push(SessionCommand::CancelUploadTimeout);
                } else {
                    log::debug!("Ignoring flash failure while {}: {}", self.status, message);
                }
            }

            SessionEvent::Agent(AgentEvent::NetworkPortList)
            | SessionEvent::Agent(AgentEvent::Unrecognized(_)) => {}

            SessionEvent::UploadTimedOut { attempt } => {
                if self.is_current(attempt, SessionStatus::Uploading) {
                    log::error!("⏱️ No answer from the agent, upload timed out");
                    self.set_status(SessionStatus::UploadError);
                }
            }
        }

        Transition {
            state: self,
            commands,
        }
    }

    fn is_current(&self, attempt: u64, status: SessionStatus) -> bool {
        if attempt != self.attempt || self.status != status {
            log::debug!(
                "Dropping stale event for attempt {} (current attempt {}, {})",
                attempt,
                self.attempt,
                self.status
            );
            return false;
        }
        true
    }

    fn set_status(&mut self, status: SessionStatus) {
        if self.status != status {
            log::info!("{} {}", status.symbol(), status);
            self.status = status;
        }
    }
}
