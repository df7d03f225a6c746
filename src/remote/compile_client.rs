//! Compile backend client

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::errors::{BridgeError, Result};
use crate::models::compile::{CompileRequest, CompileStatus, JobRef};

/// Submit/poll contract of the compile backend
#[async_trait]
pub trait CompileBackend: Send + Sync {
    /// Create a compile job for `script` targeting `board`
    async fn submit(&self, script: &str, board: &str) -> Result<JobRef>;

    /// Fetch the current status of a job
    async fn poll(&self, job: &JobRef) -> Result<CompileStatus>;
}

/// `reqwest` implementation of [`CompileBackend`]
#[derive(Clone)]
pub struct HttpCompileBackend {
    client: Client,
    base_url: Url,
}

impl HttpCompileBackend {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn submit_url(&self) -> Result<Url> {
        Ok(self.base_url.join("compilations")?)
    }

    /// Job links may be absolute or relative to the backend
    pub fn resolve_link(&self, job: &JobRef) -> Result<Url> {
        Ok(self.base_url.join(&job.link)?)
    }
}

#[async_trait]
impl CompileBackend for HttpCompileBackend {
    async fn submit(&self, script: &str, board: &str) -> Result<JobRef> {
        let url = self.submit_url()?;
        let request = CompileRequest {
            script: script.to_string(),
            board: board.to_string(),
        };
        log::debug!("POST {} (board={}, {} bytes)", url, board, script.len());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<JobRef>()
            .await
            .map_err(|e| BridgeError::Compile(format!("malformed job reference: {}", e)))
    }

    async fn poll(&self, job: &JobRef) -> Result<CompileStatus> {
        let url = self.resolve_link(job)?;
        log::trace!("GET {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;

        response
            .json::<CompileStatus>()
            .await
            .map_err(|e| BridgeError::Compile(format!("malformed job status: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_resolve_against_base() {
        let backend = HttpCompileBackend::new(Client::new(), "https://ide.example.org/api").unwrap();
        assert_eq!(
            backend.submit_url().unwrap().as_str(),
            "https://ide.example.org/api/compilations"
        );

        let relative = JobRef {
            link: "compilations/42".to_string(),
        };
        assert_eq!(
            backend.resolve_link(&relative).unwrap().as_str(),
            "https://ide.example.org/api/compilations/42"
        );

        let rooted = JobRef {
            link: "/compilations/42".to_string(),
        };
        assert_eq!(
            backend.resolve_link(&rooted).unwrap().as_str(),
            "https://ide.example.org/compilations/42"
        );

        let absolute = JobRef {
            link: "https://worker.example.org/jobs/42".to_string(),
        };
        assert_eq!(
            backend.resolve_link(&absolute).unwrap().as_str(),
            "https://worker.example.org/jobs/42"
        );
    }
}
