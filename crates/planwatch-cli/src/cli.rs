//! Command handlers for the `pw` binary.
//!
//! Handlers only read what the sync client publishes; they never modify the
//! plan collection.

use std::fmt;

use anyhow::{Context, Result};
use log::info;
use planwatch_core::{display::Plans, SnapshotLoader, SyncClientBuilder, SyncConfig, SyncView};

use crate::renderer::TerminalRenderer;

pub struct Cli {
    config: SyncConfig,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(config: SyncConfig, renderer: TerminalRenderer) -> Self {
        Self { config, renderer }
    }

    /// Fetches the snapshot once and prints it.
    pub async fn snapshot(&self) -> Result<()> {
        let loader =
            SnapshotLoader::standalone(&self.config).context("Invalid configuration")?;
        let plans = loader.load().await.context("Failed to fetch snapshot")?;
        self.renderer.render(&Plans(&plans).to_string())
    }

    /// Runs the sync client and redraws on every view change until Ctrl-C.
    pub async fn watch(&self) -> Result<()> {
        let client = SyncClientBuilder::new()
            .with_config(self.config.clone())
            .build()
            .await
            .context("Failed to start sync client")?;

        let mut views = client.subscribe();
        self.redraw(&views.borrow_and_update().clone())?;

        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    self.redraw(&view)?;
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.context("Failed to listen for Ctrl-C")?;
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        client
            .shutdown()
            .await
            .context("Failed to shut down sync client")
    }

    fn redraw(&self, view: &SyncView) -> Result<()> {
        self.renderer.clear()?;
        self.renderer.render(&ViewSummary(view).to_string())
    }
}

/// A view as a status header followed by the plan overview.
pub struct ViewSummary<'a>(pub &'a SyncView);

impl fmt::Display for ViewSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "*Connection:* {}", view.connection)?;
        if let Some(error) = &view.error {
            writeln!(f, "*Snapshot:* {error}")?;
        }
        writeln!(f)?;

        if view.loading {
            writeln!(f, "Loading plans...")
        } else {
            write!(f, "{}", Plans(&view.plans))
        }
    }
}
