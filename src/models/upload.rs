//! Agent upload request model

use serde::{Deserialize, Serialize};

use crate::models::board::BoardDescriptor;

/// File name the agent writes the artifact to before flashing
pub const SKETCH_FILENAME: &str = "sketch.hex";

/// Body of `POST {agent}/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub board: String,
    pub port: String,
    pub commandline: String,
    pub signature: String,
    pub hex: String,
    pub filename: String,
    pub extra: UploadExtra,
}

/// Protocol options of an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadExtra {
    pub auth: UploadAuth,
    pub wait_for_upload_port: bool,
    pub use_1200bps_touch: bool,
    pub network: bool,
    pub params_verbose: String,
    pub params_quiet: String,
    pub verbose: bool,
}

/// Credentials for network uploads; always empty for serial ports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAuth {
    pub password: Option<String>,
}

impl UploadRequest {
    pub fn new(hex: impl Into<String>, board: &BoardDescriptor, port: impl Into<String>) -> Self {
        Self {
            board: board.id.clone(),
            port: port.into(),
            commandline: board.commandline.clone(),
            signature: board.signature.clone(),
            hex: hex.into(),
            filename: SKETCH_FILENAME.to_string(),
            extra: UploadExtra {
                auth: UploadAuth::default(),
                wait_for_upload_port: board.wait_for_upload_port,
                use_1200bps_touch: board.use_1200bps_touch,
                network: false,
                params_verbose: "-v".to_string(),
                params_quiet: "-q -q".to_string(),
                verbose: false,
            },
        }
    }
}
