//! Session status model

use serde::{Deserialize, Serialize};

/// Authoritative status of an upload session.
///
/// Exactly one value is active at a time. Upload-initiating actions are
/// disabled while the session is busy (see [`SessionStatus::is_busy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Ready,
    SendingToServer,
    Compiling,
    Uploading,
    Done,
    CompileError,
    UploadError,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 7] = [
        SessionStatus::Ready,
        SessionStatus::SendingToServer,
        SessionStatus::Compiling,
        SessionStatus::Uploading,
        SessionStatus::Done,
        SessionStatus::CompileError,
        SessionStatus::UploadError,
    ];

    /// True while a compile or upload is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionStatus::SendingToServer | SessionStatus::Compiling | SessionStatus::Uploading
        )
    }

    /// Terminal states end the current attempt
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Done | SessionStatus::CompileError | SessionStatus::UploadError
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SessionStatus::Ready => "🟢",
            SessionStatus::SendingToServer => "📤",
            SessionStatus::Compiling => "🔨",
            SessionStatus::Uploading => "📡",
            SessionStatus::Done => "✅",
            SessionStatus::CompileError => "❌",
            SessionStatus::UploadError => "❌",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Ready => write!(f, "Ready."),
            SessionStatus::SendingToServer => write!(f, "Sending to server..."),
            SessionStatus::Compiling => write!(f, "Compiling..."),
            SessionStatus::Uploading => write!(f, "Uploading..."),
            SessionStatus::Done => write!(f, "Done."),
            SessionStatus::CompileError => write!(f, "Compile Error."),
            SessionStatus::UploadError => write!(f, "Upload Error."),
        }
    }
}
