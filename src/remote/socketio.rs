//! Minimal socket.io (Engine.IO v3) text codec
//!
//! The device agent exposes its event channel through socket.io. Only the
//! websocket transport and text frames are spoken here: the agent never
//! sends binary attachments on the default namespace.
//!
//! Frame layout: one Engine.IO type digit, then for messages one socket.io
//! type digit, an optional `/namespace,`, an optional ack id and a JSON body.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::errors::{BridgeError, Result};

/// Engine.IO protocol revision spoken by the agent
pub const ENGINE_IO_VERSION: u8 = 3;

/// Engine.IO open handshake
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between client pings
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// socket.io packet carried in an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: Option<u64>,
        args: Vec<Value>,
    },
    Error {
        namespace: String,
        message: String,
    },
}

/// Websocket URL of the socket.io endpoint under an agent channel base URL
pub fn channel_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(Some(&format!(
        "EIO={}&transport=websocket",
        ENGINE_IO_VERSION
    )));
    Ok(url)
}

/// Decode one text frame
pub fn decode(frame: &str) -> Result<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| BridgeError::Protocol("empty frame".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => {
            let handshake: Handshake = serde_json::from_str(body)
                .map_err(|e| BridgeError::Protocol(format!("bad open handshake: {}", e)))?;
            Ok(EnginePacket::Open(handshake))
        }
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => decode_socket_packet(body).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(BridgeError::Protocol(format!(
            "unknown Engine.IO packet type '{}'",
            other
        ))),
    }
}

fn decode_socket_packet(body: &str) -> Result<SocketPacket> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| BridgeError::Protocol("empty socket.io packet".to_string()))?;
    let mut rest = chars.as_str();

    let mut namespace = "/".to_string();
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => {
                namespace = rest[..idx].to_string();
                rest = &rest[idx + 1..];
            }
            None => {
                namespace = rest.to_string();
                rest = "";
            }
        }
    }

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    let id = if digits > 0 {
        rest[..digits].parse::<u64>().ok()
    } else {
        None
    };
    rest = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = parse_array(rest)?;
            if args.is_empty() {
                return Err(BridgeError::Protocol("event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(BridgeError::Protocol(format!(
                        "event name is not a string: {}",
                        other
                    )));
                }
            };
            Ok(SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            })
        }
        '3' => Ok(SocketPacket::Ack {
            namespace,
            id,
            args: parse_array(rest)?,
        }),
        '4' => {
            let message = match serde_json::from_str::<Value>(rest) {
                Ok(Value::String(s)) => s,
                Ok(other) => other.to_string(),
                Err(_) => rest.to_string(),
            };
            Ok(SocketPacket::Error { namespace, message })
        }
        '5' | '6' => Err(BridgeError::Protocol(
            "binary socket.io packets are not supported".to_string(),
        )),
        other => Err(BridgeError::Protocol(format!(
            "unknown socket.io packet type '{}'",
            other
        ))),
    }
}

fn parse_array(json: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => Ok(items),
        other => Err(BridgeError::Protocol(format!(
            "expected JSON array, got {}",
            other
        ))),
    }
}

/// Encode an event on the default namespace, e.g. `42["command","list"]`
pub fn encode_event(name: &str, args: &[Value]) -> String {
    let mut items = Vec::with_capacity(args.len() + 1);
    items.push(Value::String(name.to_string()));
    items.extend_from_slice(args);
    format!("42{}", Value::Array(items))
}

pub fn encode_ping() -> String {
    "2".to_string()
}

pub fn encode_pong(payload: &str) -> String {
    format!("3{}", payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let packet = decode(
            r#"0{"sid":"q3hQ","upgrades":[],"pingInterval":25000,"pingTimeout":60000}"#,
        )
        .unwrap();
        match packet {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "q3hQ");
                assert_eq!(handshake.ping_interval, 25000);
            }
            other => panic!("Expected Open, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_connect_and_heartbeat() {
        assert_eq!(
            decode("40").unwrap(),
            EnginePacket::Message(SocketPacket::Connect {
                namespace: "/".to_string()
            })
        );
        assert_eq!(
            decode("40/agent").unwrap(),
            EnginePacket::Message(SocketPacket::Connect {
                namespace: "/agent".to_string()
            })
        );
        assert_eq!(decode("2probe").unwrap(), EnginePacket::Ping("probe".to_string()));
        assert_eq!(decode("3").unwrap(), EnginePacket::Pong(String::new()));
        assert_eq!(decode("1").unwrap(), EnginePacket::Close);
    }

    #[test]
    fn test_decode_message_event() {
        let frame = r#"42["message","{\"Ports\":[{\"Name\":\"COM3\"}],\"Network\":false}"]"#;
        match decode(frame).unwrap() {
            EnginePacket::Message(SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            }) => {
                assert_eq!(namespace, "/");
                assert_eq!(id, None);
                assert_eq!(name, "message");
                assert_eq!(args.len(), 1);
                assert!(args[0].as_str().unwrap().contains("COM3"));
            }
            other => panic!("Expected Event, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack_id() {
        match decode(r#"42/agent,17["status",{"ok":true}]"#).unwrap() {
            EnginePacket::Message(SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            }) => {
                assert_eq!(namespace, "/agent");
                assert_eq!(id, Some(17));
                assert_eq!(name, "status");
                assert_eq!(args, vec![json!({"ok": true})]);
            }
            other => panic!("Expected Event, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_err());
        assert!(decode("9").is_err());
        assert!(decode("42{not an array}").is_err());
        assert!(decode("42[]").is_err());
        assert!(decode("451-[\"bin\",{\"_placeholder\":true,\"num\":0}]").is_err());
    }

    #[test]
    fn test_decode_error_packet() {
        assert_eq!(
            decode(r#"44"Invalid namespace""#).unwrap(),
            EnginePacket::Message(SocketPacket::Error {
                namespace: "/".to_string(),
                message: "Invalid namespace".to_string()
            })
        );
    }

    #[test]
    fn test_encode_list_command() {
        assert_eq!(
            encode_event("command", &[json!("list")]),
            r#"42["command","list"]"#
        );
        assert_eq!(encode_pong("probe"), "3probe");
    }

    #[test]
    fn test_channel_url() {
        assert_eq!(
            channel_url("ws://127.0.0.1:8991").unwrap().as_str(),
            "ws://127.0.0.1:8991/socket.io/?EIO=3&transport=websocket"
        );
        assert_eq!(
            channel_url("wss://localhost:8992/").unwrap().as_str(),
            "wss://localhost:8992/socket.io/?EIO=3&transport=websocket"
        );
        assert!(channel_url("not a url").is_err());
    }
}
