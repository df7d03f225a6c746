//! Compile job submission and status polling

use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::models::compile::{CompileResult, JobRef};
use crate::remote::compile_client::CompileBackend;

/// Submits jobs and polls them to a terminal state.
///
/// Polling is unbounded: in-progress statuses are retried at a fixed
/// interval until the backend reports success or a compile error. A
/// transport failure ends polling.
#[derive(Clone)]
pub struct CompilePoller {
    backend: Arc<dyn CompileBackend>,
    interval: Duration,
}

impl CompilePoller {
    pub fn new(backend: Arc<dyn CompileBackend>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    pub async fn submit(&self, script: &str, board: &str) -> Result<JobRef> {
        log::info!("📤 Submitting sketch for {}", board);
        let job = self.backend.submit(script, board).await?;
        log::debug!("Compile job created: {}", job.link);
        Ok(job)
    }

    pub async fn poll_until_done(&self, job: &JobRef) -> Result<CompileResult> {
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            let status = self.backend.poll(job).await?;
            match status.into_result() {
                Some(result) => {
                    log::debug!("Compile job {} finished after {} polls", job.link, polls);
                    return Ok(result);
                }
                None => {
                    log::trace!("Compile job {} still running (poll {})", job.link, polls);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BridgeError;
    use crate::models::compile::{CompileDiagnostic, CompileStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend replaying a fixed sequence of poll results
    struct ScriptedBackend {
        polls: Mutex<VecDeque<Result<CompileStatus>>>,
        poll_count: Mutex<usize>,
    }

    impl ScriptedBackend {
        fn new(polls: Vec<Result<CompileStatus>>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                poll_count: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CompileBackend for ScriptedBackend {
        async fn submit(&self, _script: &str, _board: &str) -> Result<JobRef> {
            Ok(JobRef {
                link: "/compilations/1".to_string(),
            })
        }

        async fn poll(&self, _job: &JobRef) -> Result<CompileStatus> {
            *self.poll_count.lock().unwrap() += 1;
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(CompileStatus::InProgress))
        }
    }

    fn job() -> JobRef {
        JobRef {
            link: "/compilations/1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_polls_until_success() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(CompileStatus::InProgress),
            Ok(CompileStatus::InProgress),
            Ok(CompileStatus::Success {
                hex: "ABCD".to_string(),
            }),
        ]));
        let poller = CompilePoller::new(backend.clone(), Duration::from_millis(1));

        let result = poller.poll_until_done(&job()).await.unwrap();
        assert_eq!(result, CompileResult::Artifact("ABCD".to_string()));
        assert_eq!(*backend.poll_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_compile_error_is_terminal() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(CompileStatus::CompileError {
            line_number: 1,
            error: "expected ';'".to_string(),
        })]));
        let poller = CompilePoller::new(backend, Duration::from_millis(1));

        assert_eq!(
            poller.poll_until_done(&job()).await.unwrap(),
            CompileResult::Failed(CompileDiagnostic {
                line_number: 1,
                error: "expected ';'".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_transport_failure_stops_polling() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(CompileStatus::InProgress),
            Err(BridgeError::Transport("connection reset".to_string())),
            Ok(CompileStatus::Success {
                hex: "never".to_string(),
            }),
        ]));
        let poller = CompilePoller::new(backend.clone(), Duration::from_millis(1));

        assert!(matches!(
            poller.poll_until_done(&job()).await,
            Err(BridgeError::Transport(_))
        ));
        assert_eq!(*backend.poll_count.lock().unwrap(), 2);
    }
}
