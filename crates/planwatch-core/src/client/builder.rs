//! Builder for creating and configuring sync clients.

use std::time::Duration;

use log::info;
use tokio::sync::{mpsc, watch};

use super::{worker::Worker, SyncClient, SyncView};
use crate::{
    config::{SyncConfig, TransportKind},
    connection::{ConnectionManager, ConnectionStatus},
    error::Result,
    models::Status,
    snapshot::SnapshotLoader,
};

/// Owner commands are rare; a small buffer is plenty.
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Builder for creating and configuring [`SyncClient`] instances.
#[derive(Debug, Clone, Default)]
pub struct SyncClientBuilder {
    config: SyncConfig,
}

impl SyncClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the HTTP base of the tracker API.
    ///
    /// The WebSocket URL is derived from it by rewriting `http` to `ws` and
    /// `https` to `wss`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.config.transport = transport;
        self
    }

    /// Sets the first reconnect delay; later delays double from here.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    pub fn with_max_reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.max_reconnect_interval = interval;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the silent window after which the connection is considered dead.
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.config.heartbeat_timeout = timeout;
        self
    }

    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.config.dedup_capacity = capacity;
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.event_channel_capacity = capacity;
        self
    }

    /// Only load plans with this status in snapshots.
    pub fn with_status_filter(mut self, status: Option<Status>) -> Self {
        self.config.status_filter = status;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Validates the configuration and starts the client.
    ///
    /// Must be called from within a tokio runtime. The first snapshot load
    /// and the first connection attempt start immediately.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` or `SyncError::InvalidUrl` for an
    /// unusable configuration and `SyncError::Http` if the HTTP client
    /// cannot be created.
    pub async fn build(self) -> Result<SyncClient> {
        let config = self.config;
        config.validate()?;

        let http = reqwest::Client::builder().build()?;
        let loader = SnapshotLoader::from_config(http.clone(), &config)?;

        let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());
        let (view_tx, view_rx) = watch::channel(SyncView::default());
        let (events_tx, events_rx) = mpsc::channel(config.event_channel_capacity);
        let (connection_commands, connection_commands_rx) =
            mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (worker_commands, worker_commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let manager = ConnectionManager::new(
            &config,
            http,
            status_tx,
            events_tx,
            connection_commands_rx,
        )?;
        let worker = Worker::new(
            loader,
            view_tx,
            events_rx,
            status_rx.clone(),
            worker_commands_rx,
        );

        info!(
            "Starting sync client for {} over {}",
            config.base_url, config.transport
        );
        let worker_task = tokio::spawn(worker.run());
        let connection_task = tokio::spawn(manager.run());

        Ok(SyncClient {
            view: view_rx,
            status: status_rx,
            connection_commands,
            worker_commands,
            connection_task,
            worker_task,
        })
    }
}
