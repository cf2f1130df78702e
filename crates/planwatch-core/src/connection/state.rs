//! Connection state published to the owner of the client.

use std::fmt;

/// Lifecycle state of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    /// A transport error occurred; a reconnect follows unless retries are
    /// exhausted
    Errored,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Errored => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the connection manager's externally visible state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub state: ConnectionState,

    /// Last error, transient unless `gave_up` is set
    pub error: Option<String>,

    /// Consecutive reconnect attempts scheduled since the last open
    pub attempts: u32,

    /// Reconnection stopped; only a manual reconnect resumes it
    pub gave_up: bool,

    /// Incremented every time a connection opens
    pub session: u64,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.state, self.gave_up) {
            (ConnectionState::Connected, _) => write!(f, "Connected")?,
            (ConnectionState::Connecting, _) if self.attempts > 0 => {
                write!(f, "Reconnecting (attempt {})", self.attempts)?
            }
            (ConnectionState::Connecting, _) => write!(f, "Connecting")?,
            (_, true) => write!(f, "Disconnected")?,
            (_, false) => write!(f, "Disconnected, reconnecting")?,
        }
        if let Some(error) = &self.error {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}
