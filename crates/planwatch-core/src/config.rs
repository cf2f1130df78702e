//! Client configuration and endpoint derivation.

use std::{fmt, str::FromStr, time::Duration};

use url::Url;

use crate::{
    backoff::{
        ReconnectPolicy, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_MAX_RECONNECT_INTERVAL,
        DEFAULT_RECONNECT_INTERVAL,
    },
    dedup::DEFAULT_DEDUP_CAPACITY,
    error::{Result, SyncError},
    heartbeat::DEFAULT_HEARTBEAT_TIMEOUT,
    models::Status,
};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Which push channel carries events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Bidirectional WebSocket at `ws_path`
    #[default]
    WebSocket,
    /// One-way server-sent events at `sse_path`
    Sse,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::WebSocket => "websocket",
            TransportKind::Sse => "sse",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "websocket" | "ws" => Ok(TransportKind::WebSocket),
            "sse" | "events" => Ok(TransportKind::Sse),
            _ => Err(format!("Invalid transport: {s}")),
        }
    }
}

/// Everything the client needs to know to run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// HTTP base of the tracker API, e.g. `http://localhost:8080/api`
    pub base_url: String,
    pub snapshot_path: String,
    pub ws_path: String,
    pub sse_path: String,
    pub transport: TransportKind,
    pub reconnect_interval: Duration,
    pub max_reconnect_interval: Duration,
    pub max_reconnect_attempts: u32,
    pub heartbeat_timeout: Duration,
    pub dedup_capacity: usize,
    /// Bound of the channel between the connection and the reconciler
    pub event_channel_capacity: usize,
    /// Only load plans with this status in snapshots
    pub status_filter: Option<Status>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            snapshot_path: "/plans".to_string(),
            ws_path: "/ws".to_string(),
            sse_path: "/events".to_string(),
            transport: TransportKind::default(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_interval: DEFAULT_MAX_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            event_channel_capacity: 256,
            status_filter: None,
        }
    }
}

impl SyncConfig {
    /// Checks values that would otherwise fail at runtime.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` for zero intervals or capacities
    /// and `SyncError::InvalidUrl` for an unusable base URL.
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_interval.is_zero() {
            return Err(SyncError::configuration(
                "reconnect interval must be greater than zero",
            ));
        }
        if self.max_reconnect_interval < self.reconnect_interval {
            return Err(SyncError::configuration(
                "max reconnect interval must not be below the reconnect interval",
            ));
        }
        if self.heartbeat_timeout.is_zero() {
            return Err(SyncError::configuration(
                "heartbeat timeout must be greater than zero",
            ));
        }
        if self.dedup_capacity == 0 {
            return Err(SyncError::configuration(
                "dedup capacity must be greater than zero",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(SyncError::configuration(
                "event channel capacity must be greater than zero",
            ));
        }
        self.snapshot_url()?;
        self.stream_url()?;
        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.reconnect_interval,
            self.max_reconnect_interval,
            self.max_reconnect_attempts,
        )
    }

    /// URL of the snapshot endpoint, including the status filter.
    pub fn snapshot_url(&self) -> Result<Url> {
        let mut url = self.endpoint(&self.snapshot_path)?;
        if let Some(status) = &self.status_filter {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        Ok(url)
    }

    /// URL of the push channel for the configured transport.
    pub fn stream_url(&self) -> Result<Url> {
        match self.transport {
            TransportKind::WebSocket => websocket_url(&self.endpoint(&self.ws_path)?),
            TransportKind::Sse => self.endpoint(&self.sse_path),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = Url::parse(&joined)
            .map_err(|e| SyncError::invalid_url(&joined).with_reason(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SyncError::invalid_url(joined.as_str())
                .with_reason(format!("unsupported scheme '{other}', expected http or https"))),
        }
    }
}

/// Rewrites an HTTP URL to the matching WebSocket scheme.
///
/// `http` becomes `ws` and `https` becomes `wss`; WebSocket URLs are
/// returned unchanged.
pub fn websocket_url(url: &Url) -> Result<Url> {
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SyncError::invalid_url(url.as_str())
                .with_reason(format!("cannot derive a WebSocket URL from '{other}'")))
        }
    };
    let mut rewritten = url.clone();
    rewritten
        .set_scheme(scheme)
        .map_err(|()| SyncError::invalid_url(url.as_str()).with_reason("scheme rewrite failed"))?;
    Ok(rewritten)
}
