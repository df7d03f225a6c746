//! Persistent event channel to the device agent
//!
//! The channel speaks socket.io over a websocket. Once the socket.io
//! connect packet arrives it asks the agent for its port list and keeps
//! asking at a fixed interval for as long as the channel lives. Each
//! request is scheduled only after the previous send has completed.
//! Inbound `message` events are classified into [`AgentEvent`]s and posted
//! to the session. A dropped channel is reported and not reconnected.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::errors::Result;
use crate::models::agent::AgentEvent;
use crate::models::events::SessionEvent;
use crate::remote::socketio::{self, EnginePacket, SocketPacket};
use crate::services::scheduler::ScheduledTask;

/// Command verb that makes the agent emit its port list
pub const LIST_COMMAND: &str = "list";

/// Channel timing
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub refresh_interval: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(1),
        }
    }
}

/// Open channel to the agent; dropping it tears the connection down
pub struct AgentChannel {
    task: ScheduledTask,
}

impl AgentChannel {
    /// Connect to the agent's socket.io endpoint under `base` (a ws/wss URL)
    /// and start the driver task. Session events are posted to `events`.
    pub async fn open(
        base: &str,
        settings: ChannelSettings,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Self> {
        let url = socketio::channel_url(base)?;
        log::debug!("Connecting agent channel to {}", url);

        let (ws_stream, _) = connect_async(url.as_str()).await?;
        log::info!("🔗 Agent channel transport open ({})", base);

        let task = ScheduledTask::spawn(
            "agent-channel",
            drive(ws_stream, settings, events),
        );

        Ok(Self { task })
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    pub fn close(&self) {
        self.task.cancel();
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn drive(
    ws_stream: WsStream,
    settings: ChannelSettings,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let (mut sink, mut stream) = ws_stream.split();
    let list_frame = socketio::encode_event("command", &[json!(LIST_COMMAND)]);

    let mut connected = false;
    let mut ping_interval: Option<Duration> = None;

    let refresh = tokio::time::sleep(settings.refresh_interval);
    tokio::pin!(refresh);
    let ping = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(ping);

    let reason = loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match socketio::decode(&text) {
                    Ok(EnginePacket::Open(handshake)) => {
                        let interval = Duration::from_millis(handshake.ping_interval);
                        log::debug!(
                            "Agent channel handshake: sid={} pingInterval={:?}",
                            handshake.sid,
                            interval
                        );
                        ping_interval = Some(interval);
                        ping.as_mut().reset(Instant::now() + interval);
                    }
                    Ok(EnginePacket::Message(SocketPacket::Connect { namespace })) => {
                        if namespace == "/" && !connected {
                            connected = true;
                            log::info!("🔗 Agent channel connected, requesting port list");
                            if let Err(e) = sink.send(Message::Text(list_frame.clone())).await {
                                log::warn!("Failed to request port list: {}", e);
                            }
                            refresh.as_mut().reset(Instant::now() + settings.refresh_interval);
                        }
                    }
                    Ok(EnginePacket::Message(SocketPacket::Event { name, args, .. })) => {
                        if name == "message" {
                            for arg in &args {
                                dispatch_message(arg, &events);
                            }
                        } else {
                            log::trace!("Ignoring agent event '{}'", name);
                        }
                    }
                    Ok(EnginePacket::Message(SocketPacket::Error { message, .. })) => {
                        log::warn!("Agent channel error packet: {}", message);
                    }
                    Ok(EnginePacket::Message(SocketPacket::Disconnect { namespace })) => {
                        if namespace == "/" {
                            break "agent disconnected the socket".to_string();
                        }
                    }
                    Ok(EnginePacket::Ping(payload)) => {
                        if let Err(e) = sink.send(Message::Text(socketio::encode_pong(&payload))).await {
                            log::warn!("Failed to answer agent ping: {}", e);
                        }
                    }
                    Ok(EnginePacket::Close) => break "agent closed the session".to_string(),
                    Ok(_) => {}
                    Err(e) => log::debug!("Ignoring undecodable frame {:?}: {}", text, e),
                },
                Some(Ok(Message::Close(frame))) => {
                    break format!("websocket closed ({:?})", frame);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break format!("websocket error: {}", e),
                None => break "websocket stream ended".to_string(),
            },

            _ = &mut refresh, if connected => {
                if let Err(e) = sink.send(Message::Text(list_frame.clone())).await {
                    log::warn!("Port list refresh failed: {}", e);
                }
                refresh.as_mut().reset(Instant::now() + settings.refresh_interval);
            }

            _ = &mut ping, if ping_interval.is_some() => {
                if let Err(e) = sink.send(Message::Text(socketio::encode_ping())).await {
                    log::debug!("Heartbeat ping failed: {}", e);
                }
                let interval = ping_interval.unwrap_or(settings.refresh_interval);
                ping.as_mut().reset(Instant::now() + interval);
            }
        }
    };

    log::warn!("⚠️ Agent channel closed: {}", reason);
    let _ = events.send(SessionEvent::ChannelClosed(reason));
}

/// Classify one `message` argument and post it to the session
fn dispatch_message(arg: &Value, events: &mpsc::UnboundedSender<SessionEvent>) {
    let event = match arg {
        Value::String(text) => match AgentEvent::from_message(text) {
            Some(event) => event,
            None => {
                log::debug!("Ignoring malformed agent message: {:?}", text);
                return;
            }
        },
        Value::Object(_) => AgentEvent::classify(arg),
        other => {
            log::debug!("Ignoring agent message of unexpected shape: {}", other);
            return;
        }
    };

    match &event {
        AgentEvent::Unrecognized(value) => {
            log::info!("Agent: {}", value);
            return;
        }
        AgentEvent::NetworkPortList => {
            log::trace!("Ignoring network port list");
            return;
        }
        _ => {}
    }

    let _ = events.send(SessionEvent::Agent(event));
}
