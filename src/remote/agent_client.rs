//! HTTP side of the device agent

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{BridgeError, Result};
use crate::models::upload::UploadRequest;

/// Delivers upload requests to the agent.
///
/// Completion is reported on the event channel, never in the HTTP
/// response, so implementations only confirm delivery.
#[async_trait]
pub trait AgentUploader: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<()>;
}

/// `reqwest` implementation posting to `{base}/upload`
#[derive(Clone)]
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AgentUploader for HttpAgentClient {
    async fn upload(&self, request: &UploadRequest) -> Result<()> {
        let url = self.upload_url();
        log::debug!(
            "POST {} (board={}, port={}, {} bytes of hex)",
            url,
            request.board,
            request.port,
            request.hex.len()
        );

        self.client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| BridgeError::Upload(format!("failed to reach agent: {}", e)))?;

        Ok(())
    }
}
