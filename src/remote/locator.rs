//! Device agent discovery by port scan
//!
//! The agent listens on one port of a small, fixed range on localhost and
//! serves its connection descriptor at `/info`. Ports are probed in
//! increasing order, once each; the first well-formed descriptor wins.

use reqwest::Client;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::AgentConfig;
use crate::errors::{BridgeError, Result};
use crate::models::agent::{AgentInfo, AgentScheme};

/// Where and how to look for the agent
#[derive(Debug, Clone)]
pub struct LocatorSettings {
    pub scheme: AgentScheme,
    pub host: String,
    pub ports: RangeInclusive<u16>,
    pub probe_timeout: Duration,
}

impl LocatorSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            scheme: config.scheme(),
            host: config.host.clone(),
            ports: config.port_start..=config.port_end,
            probe_timeout: config.probe_timeout(),
        }
    }

    fn info_url(&self, port: u16) -> String {
        format!("{}://{}:{}/info", self.scheme.http(), self.host, port)
    }
}

/// Scan the configured port range for a running agent
pub async fn locate_agent(client: &Client, settings: &LocatorSettings) -> Result<AgentInfo> {
    for port in settings.ports.clone() {
        let url = settings.info_url(port);
        match probe(client, &url, settings).await {
            Ok(info) => {
                log::info!(
                    "🔌 Found device agent at {} (version {})",
                    url,
                    info.version.as_deref().unwrap_or("unknown")
                );
                return Ok(info);
            }
            Err(e) => log::debug!("No agent at {}: {}", url, e),
        }
    }

    Err(BridgeError::Discovery(format!(
        "no device agent answered on {}://{}:{}..={}",
        settings.scheme.http(),
        settings.host,
        settings.ports.start(),
        settings.ports.end()
    )))
}

async fn probe(client: &Client, url: &str, settings: &LocatorSettings) -> Result<AgentInfo> {
    let response = client
        .get(url)
        .timeout(settings.probe_timeout)
        .send()
        .await?
        .error_for_status()?;

    let info: AgentInfo = response
        .json()
        .await
        .map_err(|e| BridgeError::Protocol(format!("malformed agent info: {}", e)))?;

    if !info.is_usable(settings.scheme) {
        return Err(BridgeError::Protocol(format!(
            "agent info lacks {}/{} base URLs",
            settings.scheme.http(),
            settings.scheme.ws()
        )));
    }

    Ok(info)
}
