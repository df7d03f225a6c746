//! Device agent wire models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message the agent sends when the flash tool exits with an error
pub const PROGRAMMING_FAILED_MSG: &str = "Could not program the board";

/// Which of the agent's listeners to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentScheme {
    #[default]
    Http,
    Https,
}

impl AgentScheme {
    pub fn from_secure(secure: bool) -> Self {
        if secure {
            AgentScheme::Https
        } else {
            AgentScheme::Http
        }
    }

    pub fn http(&self) -> &'static str {
        match self {
            AgentScheme::Http => "http",
            AgentScheme::Https => "https",
        }
    }

    pub fn ws(&self) -> &'static str {
        match self {
            AgentScheme::Http => "ws",
            AgentScheme::Https => "wss",
        }
    }
}

/// Connection descriptor served by the agent's `/info` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub http: Option<String>,
    #[serde(default)]
    pub https: Option<String>,
    #[serde(default)]
    pub ws: Option<String>,
    #[serde(default)]
    pub wss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl AgentInfo {
    /// Base URL for HTTP calls (`/upload`) under the given scheme
    pub fn http_base(&self, scheme: AgentScheme) -> Option<&str> {
        match scheme {
            AgentScheme::Http => self.http.as_deref(),
            AgentScheme::Https => self.https.as_deref(),
        }
    }

    /// Base URL of the event channel under the given scheme
    pub fn channel_base(&self, scheme: AgentScheme) -> Option<&str> {
        match scheme {
            AgentScheme::Http => self.ws.as_deref(),
            AgentScheme::Https => self.wss.as_deref(),
        }
    }

    /// Both base URLs needed for a session are present
    pub fn is_usable(&self, scheme: AgentScheme) -> bool {
        self.http_base(scheme).is_some_and(|u| !u.is_empty())
            && self.channel_base(scheme).is_some_and(|u| !u.is_empty())
    }
}

/// Inbound agent message, classified
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Serial port list (raw `Ports` entries)
    PortList(Vec<Value>),
    /// Network port list, not used for serial uploads
    NetworkPortList,
    FlashSucceeded,
    FlashFailed(String),
    Unrecognized(Value),
}

impl AgentEvent {
    /// Parse a message payload that arrives as JSON text.
    /// Returns `None` for payloads that are not JSON at all.
    pub fn from_message(text: &str) -> Option<Self> {
        serde_json::from_str::<Value>(text)
            .ok()
            .map(|value| Self::classify(&value))
    }

    /// Classify a decoded message payload
    pub fn classify(payload: &Value) -> Self {
        if let Some(ports) = payload.get("Ports").filter(|p| truthy(Some(p))) {
            if truthy(payload.get("Network")) {
                return AgentEvent::NetworkPortList;
            }
            // A non-array `Ports` is malformed and must not clear the list
            return match ports.as_array() {
                Some(entries) => AgentEvent::PortList(entries.clone()),
                None => AgentEvent::Unrecognized(payload.clone()),
            };
        }

        if truthy(payload.get("Flash")) {
            return AgentEvent::FlashSucceeded;
        }

        if let Some(msg) = payload.get("Msg").and_then(Value::as_str) {
            if msg == PROGRAMMING_FAILED_MSG {
                return AgentEvent::FlashFailed(msg.to_string());
            }
        }

        AgentEvent::Unrecognized(payload.clone())
    }
}

/// Loose truthiness for agent flags, which arrive as bools, strings or numbers
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
