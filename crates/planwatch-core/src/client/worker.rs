//! Reconciler task: the single writer of the plan collection.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::{mpsc, watch};

use super::SyncView;
use crate::{
    connection::{ConnectionStatus, Delivery},
    models::Plan,
    reconcile,
    router::SyncEvent,
    snapshot::SnapshotLoader,
};

/// Requests from the owner to the reconciler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerCommand {
    Refetch,
    Shutdown,
}

/// Applies events and snapshots to the collection and publishes views.
///
/// Snapshot loads run on this task, so a reload and incremental events can
/// never interleave. The reload for a new session is triggered by its
/// [`Delivery::Opened`] marker, which shares the event queue, so events of
/// an earlier session are always applied before the reload replaces them.
pub(crate) struct Worker {
    plans: Vec<Plan>,
    loader: SnapshotLoader,
    view: watch::Sender<SyncView>,
    events: mpsc::Receiver<Delivery>,
    status: watch::Receiver<ConnectionStatus>,
    commands: mpsc::Receiver<WorkerCommand>,
}

impl Worker {
    pub(crate) fn new(
        loader: SnapshotLoader,
        view: watch::Sender<SyncView>,
        events: mpsc::Receiver<Delivery>,
        status: watch::Receiver<ConnectionStatus>,
        commands: mpsc::Receiver<WorkerCommand>,
    ) -> Self {
        Self {
            plans: Vec::new(),
            loader,
            view,
            events,
            status,
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        self.load_snapshot().await;

        let mut connection_alive = true;
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(WorkerCommand::Refetch) => {
                        info!("Manual snapshot refetch");
                        self.load_snapshot().await;
                    }
                    Some(WorkerCommand::Shutdown) | None => break,
                },
                changed = self.status.changed(), if connection_alive => {
                    if changed.is_err() {
                        debug!("Connection task stopped publishing status");
                        connection_alive = false;
                        continue;
                    }
                    self.on_status_change();
                }
                Some(delivery) = self.events.recv() => match delivery {
                    Delivery::Opened { session } => {
                        info!("Session {session} opened, reloading snapshot");
                        self.load_snapshot().await;
                    }
                    Delivery::Event(event) => self.apply(event),
                },
            }
        }

        debug!("Reconciler stopped with {} plans", self.plans.len());
    }

    fn on_status_change(&mut self) {
        let status = self.status.borrow_and_update().clone();
        self.view.send_modify(|view| view.connection = status);
    }

    fn apply(&mut self, event: SyncEvent) {
        let kind = event.kind();
        if reconcile::apply(&mut self.plans, event) {
            debug!("Applied {kind}");
            self.publish_plans();
        }
    }

    async fn load_snapshot(&mut self) {
        match self.loader.load().await {
            Ok(snapshot) => {
                reconcile::replace_all(&mut self.plans, snapshot);
                let plans = Arc::new(self.plans.clone());
                self.view.send_modify(|view| {
                    view.plans = plans;
                    view.loading = false;
                    view.error = None;
                });
            }
            Err(e) => {
                error!("{e}");
                let message = e.to_string();
                self.view.send_modify(|view| {
                    view.loading = false;
                    view.error = Some(message);
                });
            }
        }
    }

    fn publish_plans(&self) {
        let plans = Arc::new(self.plans.clone());
        self.view.send_modify(|view| view.plans = plans);
    }
}
