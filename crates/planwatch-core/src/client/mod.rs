//! The sync client: owner-facing handle over the connection and reconciler
//! tasks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Delivery    ┌──────────────┐  SyncView   ┌─────────┐
//! │  connection  │─────────────▶│  reconciler  │────────────▶│  owner  │
//! │     task     │   (mpsc)     │     task     │   (watch)   │         │
//! └──────────────┘              └──────────────┘             └─────────┘
//!        │  ConnectionStatus (watch)   ▲
//!        └─────────────────────────────┘
//! ```
//!
//! The reconciler is the only writer of the plan collection. Owners read
//! immutable [`SyncView`] snapshots and never mutate them.
//!
//! # Example
//!
//! ```rust,no_run
//! use planwatch_core::{SyncClientBuilder, TransportKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SyncClientBuilder::new()
//!     .with_base_url("http://localhost:8080/api")
//!     .with_transport(TransportKind::WebSocket)
//!     .build()
//!     .await?;
//!
//! let mut views = client.subscribe();
//! while views.changed().await.is_ok() {
//!     let view = views.borrow_and_update().clone();
//!     println!("{} plans, {}", view.plans.len(), view.connection);
//! }
//!
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod worker;

use std::sync::Arc;

use log::info;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

pub use builder::SyncClientBuilder;
use worker::WorkerCommand;

use crate::{
    connection::{ConnectionCommand, ConnectionStatus},
    error::{Result, SyncError},
    models::Plan,
};

/// Read-only view of the reconciled collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncView {
    pub plans: Arc<Vec<Plan>>,

    /// True until the first snapshot load completes, successfully or not
    pub loading: bool,

    /// Error from the most recent snapshot load
    pub error: Option<String>,

    pub connection: ConnectionStatus,
}

impl SyncView {
    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}

impl Default for SyncView {
    fn default() -> Self {
        Self {
            plans: Arc::default(),
            loading: true,
            error: None,
            connection: ConnectionStatus::default(),
        }
    }
}

/// Handle to a running sync client.
///
/// Dropping the handle stops both tasks; [`SyncClient::shutdown`] does the
/// same and waits for them to finish.
pub struct SyncClient {
    view: watch::Receiver<SyncView>,
    status: watch::Receiver<ConnectionStatus>,
    connection_commands: mpsc::Sender<ConnectionCommand>,
    worker_commands: mpsc::Sender<WorkerCommand>,
    connection_task: JoinHandle<()>,
    worker_task: JoinHandle<()>,
}

impl SyncClient {
    /// Current view of the collection and connection.
    pub fn view(&self) -> SyncView {
        self.view.borrow().clone()
    }

    /// Current plans, cheap to clone.
    pub fn plans(&self) -> Arc<Vec<Plan>> {
        Arc::clone(&self.view.borrow().plans)
    }

    /// A receiver notified every time the view changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncView> {
        self.view.clone()
    }

    /// Latest connection status, possibly ahead of the view's copy.
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// A receiver notified on every connection state change.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Closes the current connection, resets the backoff, and connects
    /// again immediately. Also resumes a client that gave up.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ClientClosed` if the connection task has stopped.
    pub async fn reconnect(&self) -> Result<()> {
        self.connection_commands
            .send(ConnectionCommand::Reconnect)
            .await
            .map_err(|_| SyncError::ClientClosed)
    }

    /// Reloads the snapshot without touching the connection.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ClientClosed` if the reconciler task has stopped.
    pub async fn refetch(&self) -> Result<()> {
        self.worker_commands
            .send(WorkerCommand::Refetch)
            .await
            .map_err(|_| SyncError::ClientClosed)
    }

    /// Closes the connection, cancels pending timers, and waits for both
    /// tasks to finish. No view updates happen after this returns.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if a task panicked.
    pub async fn shutdown(self) -> Result<()> {
        // Either send fails only if that task is already gone.
        let _ = self
            .connection_commands
            .send(ConnectionCommand::Shutdown)
            .await;
        self.connection_task
            .await
            .map_err(|e| SyncError::configuration(format!("Task join error: {e}")))?;

        let _ = self.worker_commands.send(WorkerCommand::Shutdown).await;
        self.worker_task
            .await
            .map_err(|e| SyncError::configuration(format!("Task join error: {e}")))?;

        info!("Sync client shut down");
        Ok(())
    }
}
