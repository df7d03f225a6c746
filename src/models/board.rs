//! Board catalog entries

use serde::{Deserialize, Serialize};

/// Static per-target metadata needed to build a flash command.
///
/// The command template keeps the agent's placeholders
/// (`{runtime.tools.avrdude.path}`, `{serial.port}`, `{build.path}`, ...)
/// untouched; the agent expands them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    /// Fully qualified board name, e.g. `arduino:avr:uno`
    pub id: String,
    /// Human-readable name
    pub label: String,
    /// Flashing command template
    pub commandline: String,
    /// Signature of the command template, checked by the agent
    pub signature: String,
    /// Wait for the port to re-enumerate after the reset touch
    #[serde(default)]
    pub wait_for_upload_port: bool,
    /// Open the port at 1200 bps to force the bootloader
    #[serde(default)]
    pub use_1200bps_touch: bool,
}
