//! Push channels that deliver frames from the server.
//!
//! Two transports carry the same event kinds: a WebSocket and a one-way
//! server-sent events stream. [`Connection`] hides the difference behind a
//! single pull-based interface used by the connection manager.

pub mod sse;
pub mod websocket;

use url::Url;

pub use sse::{SseConnection, SseDecoder};
pub use websocket::WebSocketConnection;

use crate::{config::TransportKind, error::Result, protocol::Inbound};

/// An open push channel.
pub enum Connection {
    WebSocket(WebSocketConnection),
    Sse(SseConnection),
}

impl Connection {
    /// Opens a connection of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the handshake or the initial
    /// request fails.
    pub async fn open(kind: TransportKind, url: &Url, http: &reqwest::Client) -> Result<Self> {
        match kind {
            TransportKind::WebSocket => {
                Ok(Connection::WebSocket(WebSocketConnection::open(url).await?))
            }
            TransportKind::Sse => Ok(Connection::Sse(SseConnection::open(http, url).await?)),
        }
    }

    /// Waits for the next inbound item. `None` means the server closed the
    /// connection.
    ///
    /// Cancel-safe: no inbound data is lost if the future is dropped.
    pub async fn next(&mut self) -> Option<Result<Inbound>> {
        match self {
            Connection::WebSocket(conn) => conn.next().await,
            Connection::Sse(conn) => conn.next().await,
        }
    }

    /// Closes the connection. Errors while closing are logged, not returned.
    pub async fn close(&mut self) {
        match self {
            Connection::WebSocket(conn) => conn.close().await,
            Connection::Sse(conn) => conn.close(),
        }
    }
}
