//! Connection manager: transport lifecycle and reconnection.
//!
//! The manager runs as a single task that owns the open connection, the
//! heartbeat deadline, the dedup cache, and the backoff counter. It talks to
//! the rest of the client through three channels:
//!
//! ```text
//!   commands (mpsc) ──▶ ┌────────────────────┐ ──▶ deliveries (bounded mpsc) ──▶ reconciler
//!                       │ ConnectionManager  │
//!                       └────────────────────┘ ──▶ status (watch) ──▶ owner, reconciler
//! ```
//!
//! State machine:
//!
//! - `connecting` → `connected` on open; the attempt counter resets, the
//!   heartbeat is armed and a [`Delivery::Opened`] marker is queued ahead of
//!   the session's events.
//! - transport error → `error`, then `disconnected` with a reconnect after
//!   `min(base * 2^attempts, max)`.
//! - server close or heartbeat timeout → `disconnected`, same backoff path.
//!   The heartbeat only watches WebSocket sessions; event streams carry no
//!   keepalives and rely on the transport to report failures.
//! - after `max_attempts` consecutive attempts the manager stops retrying
//!   and waits for a manual reconnect or shutdown.

pub mod state;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use url::Url;

pub use state::{ConnectionState, ConnectionStatus};

use crate::{
    backoff::ReconnectPolicy,
    config::{SyncConfig, TransportKind},
    dedup::DedupCache,
    error::{Result, SyncError},
    heartbeat::HeartbeatMonitor,
    protocol::{Frame, Inbound},
    router::{self, Routed, SyncEvent},
    transport::Connection,
};

/// Requests from the owner to the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCommand {
    /// Close any live connection, reset the backoff, connect immediately
    Reconnect,
    /// Close everything and stop the task
    Shutdown,
}

/// Items handed to the reconciler, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A new session opened. Everything queued before it belongs to an
    /// earlier session and is superseded by the reload this triggers.
    Opened { session: u64 },
    Event(SyncEvent),
}

/// How a connection session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Unrequested close: error, server close, heartbeat timeout
    Closed,
    Reconnect,
    Shutdown,
}

pub struct ConnectionManager {
    kind: TransportKind,
    url: Url,
    http: reqwest::Client,
    policy: ReconnectPolicy,
    heartbeat: HeartbeatMonitor,
    dedup: DedupCache,
    attempts: u32,
    status: watch::Sender<ConnectionStatus>,
    events: mpsc::Sender<Delivery>,
    commands: mpsc::Receiver<ConnectionCommand>,
}

impl ConnectionManager {
    /// Creates a manager for the push endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidUrl` if the stream URL cannot be derived.
    pub fn new(
        config: &SyncConfig,
        http: reqwest::Client,
        status: watch::Sender<ConnectionStatus>,
        events: mpsc::Sender<Delivery>,
        commands: mpsc::Receiver<ConnectionCommand>,
    ) -> Result<Self> {
        Ok(Self {
            kind: config.transport,
            url: config.stream_url()?,
            http,
            policy: config.reconnect_policy(),
            heartbeat: HeartbeatMonitor::new(config.heartbeat_timeout),
            dedup: DedupCache::new(config.dedup_capacity),
            attempts: 0,
            status,
            events,
            commands,
        })
    }

    /// Runs until shutdown is requested or the command channel closes.
    pub async fn run(mut self) {
        loop {
            match self.connect_once().await {
                SessionEnd::Shutdown => break,
                SessionEnd::Reconnect => {
                    self.reset_attempts();
                    continue;
                }
                SessionEnd::Closed => {}
            }
            if !self.wait_for_retry().await {
                break;
            }
        }

        self.update(|status| status.state = ConnectionState::Disconnected);
        info!("Connection manager for {} stopped", self.url);
    }

    async fn connect_once(&mut self) -> SessionEnd {
        self.update(|status| status.state = ConnectionState::Connecting);
        info!("Connecting to {} ({})", self.url, self.kind);

        let opened = tokio::select! {
            opened = Connection::open(self.kind, &self.url, &self.http) => opened,
            command = self.commands.recv() => return Self::end_for(command),
        };
        let mut connection = match opened {
            Ok(connection) => connection,
            Err(e) => {
                error!("Connection to {} failed: {e}", self.url);
                self.fail(&e);
                return SessionEnd::Closed;
            }
        };

        self.attempts = 0;
        self.heartbeat.reset();
        self.update(|status| {
            status.state = ConnectionState::Connected;
            status.error = None;
            status.attempts = 0;
            status.gave_up = false;
            status.session += 1;
        });
        let session = self.status.borrow().session;
        info!("Connected to {} (session {session})", self.url);

        if self.events.send(Delivery::Opened { session }).await.is_err() {
            debug!("Event consumer gone, stopping");
            connection.close().await;
            return SessionEnd::Shutdown;
        }

        let end = self.drive(&mut connection).await;
        connection.close().await;
        end
    }

    async fn drive(&mut self, connection: &mut Connection) -> SessionEnd {
        let watch_heartbeat = self.watches_heartbeat();
        loop {
            tokio::select! {
                inbound = connection.next() => match inbound {
                    Some(Ok(Inbound::Frame(frame))) => {
                        self.heartbeat.reset();
                        if self.handle_frame(frame).await.is_err() {
                            debug!("Event consumer gone, stopping");
                            return SessionEnd::Shutdown;
                        }
                    }
                    Some(Ok(Inbound::Keepalive)) => self.heartbeat.reset(),
                    Some(Err(e)) => {
                        error!("Connection error: {e}");
                        self.fail(&e);
                        return SessionEnd::Closed;
                    }
                    None => {
                        info!("Connection closed by server");
                        return SessionEnd::Closed;
                    }
                },
                () = self.heartbeat.expired(), if watch_heartbeat => {
                    warn!(
                        "Heartbeat timeout after {}s, reconnecting",
                        self.heartbeat.timeout().as_secs_f32()
                    );
                    return SessionEnd::Closed;
                }
                command = self.commands.recv() => return Self::end_for(command),
            }
        }
    }

    /// Deduplicates, routes, and forwards one frame.
    ///
    /// Parse failures are reported on the status channel and otherwise
    /// ignored. Fails only when the event consumer has gone away.
    async fn handle_frame(&mut self, frame: Frame) -> Result<()> {
        let envelope = match frame.into_envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                self.report_parse_error(&e);
                return Ok(());
            }
        };

        if let Some(id) = envelope.id.as_deref() {
            if self.dedup.has(id) {
                debug!("Duplicate message ignored: {id}");
                return Ok(());
            }
            self.dedup.add(id);
        }

        match router::route(envelope) {
            Ok(Routed::Event(event)) => {
                debug!("Received {}", event.kind());
                self.events
                    .send(Delivery::Event(event))
                    .await
                    .map_err(|_| SyncError::ClientClosed)
            }
            Ok(Routed::Acknowledged) => {
                debug!("Server acknowledged connection");
                self.update(|status| {
                    status.state = ConnectionState::Connected;
                    status.error = None;
                });
                Ok(())
            }
            Ok(Routed::Ignored(_)) => Ok(()),
            Err(e) => {
                self.report_parse_error(&e);
                Ok(())
            }
        }
    }

    /// Sleeps out the backoff delay, or gives up once attempts are
    /// exhausted. Returns `false` when the task should stop.
    async fn wait_for_retry(&mut self) -> bool {
        let Some(delay) = self.policy.next_delay(self.attempts) else {
            return self.wait_after_giving_up().await;
        };

        self.attempts += 1;
        let attempts = self.attempts;
        warn!(
            "Reconnecting in {}ms (attempt {attempts})",
            delay.as_millis()
        );
        self.update(|status| {
            status.state = ConnectionState::Disconnected;
            status.attempts = attempts;
        });

        tokio::select! {
            () = tokio::time::sleep(delay) => true,
            command = self.commands.recv() => match command {
                Some(ConnectionCommand::Reconnect) => {
                    info!("Manual reconnect requested");
                    self.reset_attempts();
                    true
                }
                Some(ConnectionCommand::Shutdown) | None => false,
            },
        }
    }

    async fn wait_after_giving_up(&mut self) -> bool {
        let failure = SyncError::MaxReconnectAttempts {
            attempts: self.attempts,
        };
        error!("{failure}");
        self.update(|status| {
            status.state = ConnectionState::Disconnected;
            status.gave_up = true;
            status.error = Some(failure.to_string());
        });

        match self.commands.recv().await {
            Some(ConnectionCommand::Reconnect) => {
                info!("Manual reconnect requested");
                self.reset_attempts();
                true
            }
            Some(ConnectionCommand::Shutdown) | None => false,
        }
    }

    /// Starts a fresh backoff sequence, clearing any give-up.
    fn reset_attempts(&mut self) {
        self.attempts = 0;
        self.update(|status| {
            status.attempts = 0;
            status.gave_up = false;
        });
    }

    fn watches_heartbeat(&self) -> bool {
        self.kind == TransportKind::WebSocket
    }

    fn end_for(command: Option<ConnectionCommand>) -> SessionEnd {
        match command {
            Some(ConnectionCommand::Reconnect) => {
                info!("Manual reconnect requested");
                SessionEnd::Reconnect
            }
            Some(ConnectionCommand::Shutdown) | None => SessionEnd::Shutdown,
        }
    }

    fn fail(&self, e: &SyncError) {
        let message = e.to_string();
        self.update(|status| {
            status.state = ConnectionState::Errored;
            status.error = Some(message);
        });
    }

    fn report_parse_error(&self, e: &SyncError) {
        error!("{e}");
        let message = e.to_string();
        self.update(|status| status.error = Some(message));
    }

    fn update(&self, modify: impl FnOnce(&mut ConnectionStatus)) {
        self.status.send_modify(modify);
    }
}
