//! Application configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{BridgeError, Result};
use crate::models::agent::AgentScheme;
use crate::models::board::BoardDescriptor;

/// First port the agent listens on
pub const AGENT_PORT_START: u16 = 8990;
/// Last port probed during agent discovery
pub const AGENT_PORT_END: u16 = 9000;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the compile backend (`/compilations` is appended)
    pub compile_server_url: String,
    /// Board selected when none is given on the command line
    pub default_board: Option<String>,
    /// Device agent discovery
    pub agent: AgentConfig,
    /// Poll, refresh and timeout intervals
    pub timing: TimingConfig,
    /// Extra catalog entries
    pub boards: Vec<BoardDescriptor>,
}

/// Device agent discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Use the agent's https/wss listeners
    pub secure: bool,
    /// Host the agent listens on
    pub host: String,
    pub port_start: u16,
    pub port_end: u16,
    /// Per-probe request timeout in milliseconds
    pub probe_timeout_ms: u64,
}

/// Scheduling intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub poll_interval_ms: u64,
    pub port_refresh_ms: u64,
    pub upload_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compile_server_url: "http://localhost:3000".to_string(),
            default_board: None,
            agent: AgentConfig::default(),
            timing: TimingConfig::default(),
            boards: Vec::new(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            secure: false,
            host: "localhost".to_string(),
            port_start: AGENT_PORT_START,
            port_end: AGENT_PORT_END,
            probe_timeout_ms: 2000,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            port_refresh_ms: 1000,
            upload_timeout_secs: 30,
        }
    }
}

impl AgentConfig {
    pub fn scheme(&self) -> AgentScheme {
        AgentScheme::from_secure(self.secure)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn port_refresh(&self) -> Duration {
        Duration::from_millis(self.port_refresh_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl AppConfig {
    /// Default location: `<config dir>/sketchbridge/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sketchbridge")
            .join("config.toml")
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the given file, or the default file if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    log::debug!(
                        "No configuration file at {}, using defaults",
                        path.display()
                    );
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent.port_start > self.agent.port_end {
            return Err(BridgeError::Config(format!(
                "agent.port_start ({}) is above agent.port_end ({})",
                self.agent.port_start, self.agent.port_end
            )));
        }
        if self.agent.host.trim().is_empty() {
            return Err(BridgeError::Config("agent.host must not be empty".to_string()));
        }
        url::Url::parse(&self.compile_server_url)?;
        if self.timing.poll_interval_ms == 0 || self.timing.port_refresh_ms == 0 {
            return Err(BridgeError::Config(
                "poll and port refresh intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
