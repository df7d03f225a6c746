//! Cancellable background tasks
//!
//! Every perpetual loop of a session (channel driver, compile polling) and
//! the upload timeout runs as a [`ScheduledTask`]. Dropping or cancelling
//! the handle aborts the task, which gives sessions a teardown path.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to a spawned task that is aborted on cancel or drop
#[derive(Debug)]
pub struct ScheduledTask {
    name: String,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn a task on the current runtime
    pub fn spawn<F>(name: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            handle: tokio::spawn(future),
        }
    }

    /// Run `action` once after `delay` unless cancelled first
    pub fn after<A>(name: impl Into<String>, delay: Duration, action: A) -> Self
    where
        A: FnOnce() + Send + 'static,
    {
        Self::spawn(name, async move {
            tokio::time::sleep(delay).await;
            action();
        })
    }

    /// Abort the task. Calling this more than once is harmless.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            log::trace!("Cancelling scheduled task '{}'", self.name);
            self.handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
