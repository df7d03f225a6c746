//! Device port models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display hint for a port entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    Warning,
}

/// A selectable device port as reported by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Port identifier (the agent's `Name`)
    pub value: String,
    pub label: String,
    /// Raw port entry from the agent, kept opaque
    pub port: Value,
    /// Set when the selected port vanished from the latest list
    #[serde(default)]
    pub disconnected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DisplayStyle>,
}

impl PortDescriptor {
    /// Build a descriptor from one entry of an agent `Ports` array.
    /// Entries without a string `Name` are not ports.
    pub fn from_agent_entry(entry: &Value) -> Option<Self> {
        let name = entry.get("Name")?.as_str()?;
        Some(Self {
            value: name.to_string(),
            label: name.to_string(),
            port: entry.clone(),
            disconnected: false,
            style: None,
        })
    }

    /// Flag this descriptor as no longer present on the agent
    pub fn mark_disconnected(&mut self) {
        self.disconnected = true;
        self.style = Some(DisplayStyle::Warning);
    }
}

/// Displayed port options together with the current selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortSelection {
    pub options: Vec<PortDescriptor>,
    pub selected: Option<PortDescriptor>,
}
