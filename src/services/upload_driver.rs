//! Upload driver: hands an artifact to the agent and guards the wait
//!
//! The upload request is fire-and-forget; the agent reports the outcome on
//! its event channel. The driver arms a timeout as soon as the session
//! enters `Uploading` and the session cancels it when a terminal channel
//! event arrives first.

use std::sync::Arc;
use std::time::Duration;

use crate::models::board::BoardDescriptor;
use crate::models::port::PortDescriptor;
use crate::models::upload::UploadRequest;
use crate::remote::agent_client::AgentUploader;
use crate::services::scheduler::ScheduledTask;

/// What happened to an upload request when it was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDispatch {
    /// Request handed to the agent
    Sent,
    /// No port selected
    RefusedNoPort,
    /// Selected port is flagged disconnected
    RefusedDisconnected,
    /// No agent located yet
    NoAgent,
}

pub struct UploadDriver {
    uploader: Option<Arc<dyn AgentUploader>>,
    timeout: Duration,
    pending_timeout: Option<ScheduledTask>,
}

impl UploadDriver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            uploader: None,
            timeout,
            pending_timeout: None,
        }
    }

    pub fn attach(&mut self, uploader: Arc<dyn AgentUploader>) {
        self.uploader = Some(uploader);
    }

    /// Build the request, refusing when the selected port cannot be used
    pub fn prepare(
        artifact: &str,
        board: &BoardDescriptor,
        port: Option<&PortDescriptor>,
    ) -> Result<UploadRequest, UploadDispatch> {
        match port {
            None => Err(UploadDispatch::RefusedNoPort),
            Some(port) if port.disconnected => Err(UploadDispatch::RefusedDisconnected),
            Some(port) => Ok(UploadRequest::new(artifact, board, port.value.clone())),
        }
    }

    /// Arm the timeout, then deliver the request to the agent.
    ///
    /// `on_timeout` runs if [`UploadDriver::cancel_timeout`] is not called
    /// within the timeout window.
    pub fn start<F>(
        &mut self,
        artifact: &str,
        board: &BoardDescriptor,
        port: Option<&PortDescriptor>,
        on_timeout: F,
    ) -> UploadDispatch
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel_timeout();
        self.pending_timeout = Some(ScheduledTask::after(
            "upload-timeout",
            self.timeout,
            on_timeout,
        ));

        let request = match Self::prepare(artifact, board, port) {
            Ok(request) => request,
            Err(refusal) => {
                log::warn!("Upload not sent: {:?}", refusal);
                return refusal;
            }
        };

        let Some(uploader) = self.uploader.clone() else {
            log::error!("Upload not sent: no device agent available");
            return UploadDispatch::NoAgent;
        };

        log::info!(
            "📡 Uploading to {} on {} ({} bytes)",
            request.board,
            request.port,
            request.hex.len()
        );
        tokio::spawn(async move {
            if let Err(e) = uploader.upload(&request).await {
                log::error!("Upload request failed: {}", e);
            }
        });

        UploadDispatch::Sent
    }

    /// Disarm the pending timeout, if any
    pub fn cancel_timeout(&mut self) {
        if let Some(task) = self.pending_timeout.take() {
            task.cancel();
        }
    }

    pub fn has_pending_timeout(&self) -> bool {
        self.pending_timeout
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}
