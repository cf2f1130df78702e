//! Core library for the planwatch real-time plan tracker client.
//!
//! The crate keeps a local copy of a server's plans and steps in sync: it
//! loads a full snapshot over HTTP, then applies create/update/delete events
//! pushed over a WebSocket or a server-sent events stream. Transport
//! failures are survived transparently through exponential-backoff
//! reconnection, each reconnect triggers a fresh snapshot, and duplicate
//! deliveries are filtered by message id.
//!
//! # Architecture
//!
//! - [`dedup`], [`heartbeat`], [`backoff`]: small leaf components owned by
//!   the connection task
//! - [`transport`] and [`connection`]: the push channel and its lifecycle
//! - [`protocol`] and [`router`]: wire envelopes and typed events
//! - [`reconcile`]: pure transitions applying events to the collection
//! - [`snapshot`]: full reloads
//! - [`client`]: wires everything together behind [`SyncClient`]
//! - [`display`]: markdown formatting for presentation layers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use planwatch_core::{display::Plans, SyncClientBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SyncClientBuilder::new()
//!     .with_base_url("http://localhost:8080/api")
//!     .build()
//!     .await?;
//!
//! let mut views = client.subscribe();
//! views.changed().await?;
//! println!("{}", Plans(&views.borrow().plans));
//!
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod client;
pub mod config;
pub mod connection;
pub mod dedup;
pub mod display;
pub mod error;
pub mod heartbeat;
pub mod models;
pub mod protocol;
pub mod reconcile;
pub mod router;
pub mod snapshot;
pub mod transport;

// Re-export commonly used types
pub use client::{SyncClient, SyncClientBuilder, SyncView};
pub use config::{SyncConfig, TransportKind};
pub use connection::{ConnectionState, ConnectionStatus};
pub use error::{Result, SyncError};
pub use models::{Plan, PlanPatch, Status, Step};
pub use router::SyncEvent;
pub use snapshot::SnapshotLoader;
