use clap::{Parser, Subcommand};
use planwatch_core::{config::DEFAULT_BASE_URL, Status, TransportKind};

/// Live terminal view of a plan tracker
///
/// Loads every plan from the tracker's API, then keeps the view current from
/// the server's push channel, reconnecting on its own when the connection
/// drops.
#[derive(Parser)]
#[command(version, about, name = "pw")]
pub struct Args {
    /// HTTP base URL of the tracker API
    #[arg(long, global = true, env = "PLANWATCH_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Push channel to use: websocket or sse
    #[arg(long, global = true, default_value_t = TransportKind::WebSocket)]
    pub transport: TransportKind,

    /// Only show plans with this status (pending, in_progress, completed,
    /// failed)
    #[arg(long, global = true)]
    pub status: Option<Status>,

    /// Give up after this many consecutive failed reconnects
    #[arg(long, global = true)]
    pub max_reconnect_attempts: Option<u32>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands. Without one, `watch` runs.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Follow the tracker live until interrupted
    #[command(alias = "w")]
    Watch,
    /// Fetch all plans once and print them
    #[command(alias = "s")]
    Snapshot,
}
