// src/watch/dispatcher.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::Supervisor;
use crate::watch::source::ChangeEvent;

/// Consumes the filtered change-event stream and invokes the supervisor's
/// on-change transition once per event.
///
/// Each event becomes an independent task; overlapping transitions are
/// serialized by the role registry's lock, not here. Events are not queued
/// or coalesced beyond the source's own pending cap.
pub struct ChangeDispatcher {
    supervisor: Arc<Supervisor>,
}

impl ChangeDispatcher {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    /// Run until the event stream closes.
    pub async fn run(self, mut events: mpsc::Receiver<ChangeEvent>) {
        while let Some(event) = events.recv().await {
            debug!(path = ?event.path, "dispatching on-change transition");
            tokio::spawn(Arc::clone(&self.supervisor).handle_change());
        }
        debug!("change event stream closed; dispatcher finished");
    }
}
