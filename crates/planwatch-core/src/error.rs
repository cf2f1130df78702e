//! Error types for the sync client.

use std::fmt;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Comprehensive error type for all sync client operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The configured endpoint cannot be used
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// HTTP transport errors (snapshot fetch, server-push stream)
    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
    /// WebSocket transport errors
    #[error("WebSocket error: {source}")]
    WebSocket { source: Box<tungstenite::Error> },
    /// Malformed inbound frames
    #[error("Failed to parse message from server: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
    /// Snapshot endpoint answered with something other than a plan list
    #[error("Snapshot fetch failed: {message}")]
    Snapshot { message: String },
    /// Reconnection gave up
    #[error("Max reconnection attempts reached ({attempts})")]
    MaxReconnectAttempts { attempts: u32 },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// The client has been shut down
    #[error("Sync client is closed")]
    ClientClosed,
}

impl From<tungstenite::Error> for SyncError {
    fn from(source: tungstenite::Error) -> Self {
        SyncError::WebSocket {
            source: Box::new(source),
        }
    }
}

/// Builder for creating invalid URL errors.
pub struct InvalidUrlBuilder {
    url: String,
}

impl InvalidUrlBuilder {
    /// Create a new invalid URL error builder for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> SyncError {
        SyncError::InvalidUrl {
            url: self.url,
            reason: reason.into(),
        }
    }
}

impl SyncError {
    /// Creates a builder for invalid URL errors.
    pub fn invalid_url(url: impl Into<String>) -> InvalidUrlBuilder {
        InvalidUrlBuilder::new(url)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration {
            message: message.into(),
        }
    }
}

/// Extension trait for Result to attach snapshot context to foreign errors.
pub trait ResultExt<T> {
    /// Map the error into a [`SyncError::Snapshot`] prefixed with `context`.
    fn snapshot_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn snapshot_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| SyncError::Snapshot {
            message: format!("{context}: {e}"),
        })
    }
}

/// Result type alias for sync client operations
pub type Result<T> = std::result::Result<T, SyncError>;
