//! Session runner: executes the state machine's side effects
//!
//! The runner owns the [`SessionState`] and is the only task that mutates
//! it. Editor input, compile results, agent channel traffic and timeouts
//! all arrive as [`SessionEvent`]s on one queue. Each event is applied,
//! the resulting commands are executed by spawning tasks that post their
//! outcome back onto the queue, and a fresh [`SessionSnapshot`] is
//! published.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::agent::{AgentInfo, AgentScheme};
use crate::models::board::BoardDescriptor;
use crate::models::events::{SessionCommand, SessionEvent};
use crate::models::session::SessionSnapshot;
use crate::remote::{
    AgentChannel, AgentUploader, ChannelSettings, CompileBackend, HttpAgentClient,
    HttpCompileBackend, LocatorSettings, locate_agent,
};
use crate::services::compile_poller::CompilePoller;
use crate::services::scheduler::ScheduledTask;
use crate::services::session_machine::{SessionState, Transition};
use crate::services::upload_driver::{UploadDispatch, UploadDriver};

/// Everything a session needs to reach its peers
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub compile_url: String,
    pub locator: LocatorSettings,
    pub channel: ChannelSettings,
    pub poll_interval: Duration,
    pub upload_timeout: Duration,
    /// Scan for the agent when the session starts
    pub discover_agent: bool,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            compile_url: config.compile_server_url.clone(),
            locator: LocatorSettings::from_config(&config.agent),
            channel: ChannelSettings {
                refresh_interval: config.timing.port_refresh(),
            },
            poll_interval: config.timing.poll_interval(),
            upload_timeout: config.timing.upload_timeout(),
            discover_agent: true,
        }
    }
}

/// Builder for a running session
pub struct SessionRunner {
    settings: SessionSettings,
    board: BoardDescriptor,
    source: String,
    client: Client,
    compile_backend: Arc<dyn CompileBackend>,
    uploader: Option<Arc<dyn AgentUploader>>,
}

impl SessionRunner {
    pub fn new(settings: SessionSettings, board: BoardDescriptor) -> Result<Self> {
        let client = Client::builder().build()?;
        let compile_backend = Arc::new(HttpCompileBackend::new(
            client.clone(),
            &settings.compile_url,
        )?);

        Ok(Self {
            settings,
            board,
            source: String::new(),
            client,
            compile_backend,
            uploader: None,
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Replace the HTTP compile backend
    pub fn with_compile_backend(mut self, backend: Arc<dyn CompileBackend>) -> Self {
        self.compile_backend = backend;
        self
    }

    /// Use a fixed uploader instead of the one built from the located agent
    pub fn with_uploader(mut self, uploader: Arc<dyn AgentUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Start the session on the current tokio runtime
    pub fn spawn(self) -> SessionHandle {
        let state = SessionState::new(self.board, self.source);
        let (snapshots_tx, snapshots_rx) = watch::channel(state.snapshot());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (channels_tx, channels_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut driver = UploadDriver::new(self.settings.upload_timeout);
        let uploader_fixed = self.uploader.is_some();
        if let Some(uploader) = self.uploader {
            driver.attach(uploader);
        }

        let mut task = SessionTask {
            state: Some(state),
            events: events_tx.clone(),
            snapshots: snapshots_tx,
            poller: CompilePoller::new(self.compile_backend, self.settings.poll_interval),
            driver,
            uploader_fixed,
            scheme: self.settings.locator.scheme,
            client: self.client.clone(),
            compile_task: None,
            discovery_task: None,
            channel: None,
        };

        if self.settings.discover_agent {
            task.discovery_task = Some(ScheduledTask::spawn(
                "agent-discovery",
                discover(
                    self.client,
                    self.settings.locator,
                    self.settings.channel,
                    events_tx.clone(),
                    channels_tx,
                ),
            ));
        }

        let join = tokio::spawn(task.run(events_rx, channels_rx, shutdown_rx));

        SessionHandle {
            events: events_tx,
            snapshots: snapshots_rx,
            shutdown: Some(shutdown_tx),
            task: join,
        }
    }
}

/// Locate the agent, then open its event channel
async fn discover(
    client: Client,
    locator: LocatorSettings,
    channel_settings: ChannelSettings,
    events: mpsc::UnboundedSender<SessionEvent>,
    channels: mpsc::UnboundedSender<AgentChannel>,
) {
    let info = match locate_agent(&client, &locator).await {
        Ok(info) => info,
        Err(e) => {
            let _ = events.send(SessionEvent::AgentUnavailable(e.to_string()));
            return;
        }
    };

    let channel_base = info.channel_base(locator.scheme).map(str::to_string);
    let _ = events.send(SessionEvent::AgentReady(info));

    let Some(base) = channel_base else {
        let _ = events.send(SessionEvent::ChannelClosed(
            "agent advertised no channel endpoint".to_string(),
        ));
        return;
    };

    match AgentChannel::open(&base, channel_settings, events.clone()).await {
        Ok(channel) => {
            let _ = channels.send(channel);
        }
        Err(e) => {
            let _ = events.send(SessionEvent::ChannelClosed(e.to_string()));
        }
    }
}

struct SessionTask {
    state: Option<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    poller: CompilePoller,
    driver: UploadDriver,
    uploader_fixed: bool,
    scheme: AgentScheme,
    client: Client,
    compile_task: Option<ScheduledTask>,
    discovery_task: Option<ScheduledTask>,
    channel: Option<AgentChannel>,
}

impl SessionTask {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        mut channels: mpsc::UnboundedReceiver<AgentChannel>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        log::debug!("Session started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(channel) = channels.recv() => {
                    log::debug!("Agent channel attached to session");
                    self.channel = Some(channel);
                }
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        self.teardown();
    }

    fn handle(&mut self, event: SessionEvent) {
        let Some(state) = self.state.take() else {
            return;
        };

        if let SessionEvent::AgentReady(info) = &event {
            self.attach_agent(info);
        }

        let Transition { state, commands } = state.apply(event);
        let snapshot = state.snapshot();
        self.state = Some(state);

        for command in commands {
            self.execute(command);
        }
        self.snapshots.send_replace(snapshot);
    }

    fn attach_agent(&mut self, info: &AgentInfo) {
        if self.uploader_fixed {
            return;
        }
        match info.http_base(self.scheme) {
            Some(base) => {
                let client = HttpAgentClient::new(self.client.clone(), base);
                log::debug!("Uploads go to {}", client.upload_url());
                self.driver.attach(Arc::new(client));
            }
            None => log::warn!("Agent advertised no {} endpoint", self.scheme.http()),
        }
    }

    fn execute(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SubmitCompile {
                attempt,
                script,
                board_id,
            } => {
                let poller = self.poller.clone();
                let events = self.events.clone();
                self.compile_task = Some(ScheduledTask::spawn("compile-submit", async move {
                    let event = match poller.submit(&script, &board_id).await {
                        Ok(job) => SessionEvent::CompileSubmitted { attempt, job },
                        Err(e) => SessionEvent::CompileSubmitFailed {
                            attempt,
                            reason: e.to_string(),
                        },
                    };
                    let _ = events.send(event);
                }));
            }

            SessionCommand::PollJob { attempt, job } => {
                let poller = self.poller.clone();
                let events = self.events.clone();
                self.compile_task = Some(ScheduledTask::spawn("compile-poll", async move {
                    let event = match poller.poll_until_done(&job).await {
                        Ok(result) => SessionEvent::CompileFinished { attempt, result },
                        Err(e) => SessionEvent::CompilePollFailed {
                            attempt,
                            reason: e.to_string(),
                        },
                    };
                    let _ = events.send(event);
                }));
            }

            SessionCommand::Upload {
                attempt,
                artifact,
                board,
                port,
            } => {
                let events = self.events.clone();
                let dispatch = self.driver.start(&artifact, &board, port.as_ref(), move || {
                    let _ = events.send(SessionEvent::UploadTimedOut { attempt });
                });
                if dispatch != UploadDispatch::Sent {
                    log::warn!(
                        "Upload attempt {} not delivered ({:?}), waiting for timeout",
                        attempt,
                        dispatch
                    );
                }
            }

            SessionCommand::CancelUploadTimeout => {
                if self.driver.has_pending_timeout() {
                    log::debug!("Disarming upload timeout");
                }
                self.driver.cancel_timeout();
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        if let Some(task) = self.compile_task.take() {
            task.cancel();
        }
        if let Some(task) = self.discovery_task.take() {
            task.cancel();
        }
        self.driver.cancel_timeout();
        log::debug!("Session stopped");
    }
}

/// Client side of a running session
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Post a raw event; false once the session has stopped
    pub fn send(&self, event: SessionEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn edit_source(&self, source: impl Into<String>) -> bool {
        self.send(SessionEvent::SourceEdited(source.into()))
    }

    pub fn select_board(&self, board: BoardDescriptor) -> bool {
        self.send(SessionEvent::BoardSelected(board))
    }

    pub fn select_port(&self, id: impl Into<String>) -> bool {
        self.send(SessionEvent::PortSelected(id.into()))
    }

    pub fn request_upload(&self) -> bool {
        self.send(SessionEvent::UploadRequested)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`, or give up after `timeout`
    pub async fn wait_for<P>(&self, timeout: Duration, mut predicate: P) -> Option<SessionSnapshot>
    where
        P: FnMut(&SessionSnapshot) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        match tokio::time::timeout(timeout, snapshots.wait_for(|s| predicate(s))).await {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            _ => None,
        }
    }

    /// Stop the session and cancel every task it started
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            log::warn!("Session task ended abnormally: {}", e);
        }
    }
}
