//! Custom error types for sketchbridge

use std::fmt;

/// Main error type for sketchbridge operations
#[derive(Debug)]
pub enum BridgeError {
    /// Configuration related errors
    Config(String),
    /// No device agent answered in the probed port range
    Discovery(String),
    /// HTTP requests that failed or returned a non-success status
    Transport(String),
    /// Event channel (websocket) errors
    Channel(String),
    /// Payloads that did not match the expected wire format
    Protocol(String),
    /// Compile backend errors
    Compile(String),
    /// Upload/flash errors
    Upload(String),
    /// General I/O errors
    Io(std::io::Error),
    /// Serialization errors
    Serialization(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BridgeError::Discovery(msg) => write!(f, "Agent discovery error: {}", msg),
            BridgeError::Transport(msg) => write!(f, "Transport error: {}", msg),
            BridgeError::Channel(msg) => write!(f, "Channel error: {}", msg),
            BridgeError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            BridgeError::Compile(msg) => write!(f, "Compile error: {}", msg),
            BridgeError::Upload(msg) => write!(f, "Upload error: {}", msg),
            BridgeError::Io(err) => write!(f, "I/O error: {}", err),
            BridgeError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err)
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for BridgeError {
    fn from(err: url::ParseError) -> Self {
        BridgeError::Config(format!("invalid URL: {}", err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for BridgeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        BridgeError::Channel(err.to_string())
    }
}

/// Result type alias for sketchbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
