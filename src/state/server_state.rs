use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use crate::domain::city::City;
use crate::state::commands::SessionCommand;
use crate::state::snapshot::Snapshot;

/// Handle to the running session: its command queue, published snapshots and tasks
pub struct SessionHandle {
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    pub city: Arc<City>,
    pub task_handle: JoinHandle<()>,
    pub flavor_handle: JoinHandle<()>,
}

/// Shared server state - network handlers only ever talk to the session through here
pub struct ServerState {
    session: SessionHandle,
}

impl ServerState {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Enqueue a command without waiting; fails when the queue is full or the tick task is gone
    pub fn submit(&self, command: SessionCommand) -> Result<(), &'static str> {
        self.session.command_tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => "Command queue full",
            mpsc::error::TrySendError::Closed(_) => "Session stopped",
        })
    }

    /// Most recently published snapshot
    pub fn latest_snapshot(&self) -> Arc<Snapshot> {
        self.session.snapshot_rx.borrow().clone()
    }

    pub fn city(&self) -> Arc<City> {
        self.session.city.clone()
    }
}

impl Drop for ServerState {
    fn drop(&mut self) {
        self.session.task_handle.abort();
        self.session.flavor_handle.abort();
    }
}
