//! Ports command implementation - Show the agent's serial ports

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::models::agent::AgentEvent;
use crate::models::events::SessionEvent;
use crate::remote::{AgentChannel, ChannelSettings, LocatorSettings, locate_agent};
use crate::services::port_reconciler::reconcile;

pub async fn execute_ports_command(config: &AppConfig, wait: u64) -> Result<()> {
    let settings = LocatorSettings::from_config(&config.agent);
    let client = Client::builder().build()?;
    let info = locate_agent(&client, &settings)
        .await
        .context("Device agent not found. Is it running?")?;

    let base = info
        .channel_base(settings.scheme)
        .ok_or_else(|| anyhow!("Agent advertised no event channel"))?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let channel = AgentChannel::open(
        base,
        ChannelSettings {
            refresh_interval: config.timing.port_refresh(),
        },
        events_tx,
    )
    .await
    .context("Failed to open the agent event channel")?;

    let first_list = tokio::time::timeout(Duration::from_secs(wait), async {
        while let Some(event) = events_rx.recv().await {
            match event {
                SessionEvent::Agent(AgentEvent::PortList(raw)) => return Some(raw),
                SessionEvent::ChannelClosed(reason) => {
                    log::warn!("Agent channel closed: {}", reason);
                    return None;
                }
                _ => {}
            }
        }
        None
    })
    .await;
    channel.close();

    let raw = match first_list {
        Ok(Some(raw)) => raw,
        Ok(None) => return Err(anyhow!("Agent channel closed before reporting ports")),
        Err(_) => return Err(anyhow!("No port list received within {}s", wait)),
    };

    let selection = reconcile(None, &raw);
    if selection.options.is_empty() {
        println!("⚠️  The agent reports no serial ports");
        return Ok(());
    }

    println!("🔍 Serial ports reported by the agent:");
    for port in &selection.options {
        let marker = if selection.selected.as_ref() == Some(port) {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", port.label, marker);
    }
    println!("\nTotal ports: {}", selection.options.len());
    Ok(())
}
