// src/engine/shutdown.rs

//! OS-signal-driven shutdown.
//!
//! On SIGINT/SIGTERM the coordinator kills the action, then the primary,
//! each with a bounded wait, runs one reap pass, and exits 0. The action is
//! killed first because at most one of the two roles is usually truly
//! active, but both kills are always attempted.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::Supervisor;
use crate::proc::reaper::{self, DEFAULT_REAP_POLLS};
use crate::registry::ProcessRole;

/// Liveness polls granted to each role during shutdown (2 attempts x 2 s).
const SHUTDOWN_KILL_ATTEMPTS: u32 = 2;

/// Complete when the process receives a termination signal.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

/// Spawn the coordinator task. It drives the whole shutdown sequence and
/// terminates the process with status 0.
pub fn spawn_shutdown_coordinator(supervisor: Arc<Supervisor>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = wait_for_shutdown_signal().await {
            warn!(error = %err, "failed to listen for termination signals");
            return;
        }
        info!("termination signal received; stopping managed processes");
        supervisor.begin_shutdown();

        if let Err(err) = supervisor
            .kill_role(ProcessRole::Action, SHUTDOWN_KILL_ATTEMPTS)
            .await
        {
            error!(error = %err, "killing the action during shutdown returned an error");
        }
        if let Err(err) = supervisor
            .kill_role(ProcessRole::Primary, SHUTDOWN_KILL_ATTEMPTS)
            .await
        {
            error!(error = %err, "killing the primary during shutdown returned an error");
        }

        reaper::reap(DEFAULT_REAP_POLLS).await;
        info!("shutdown complete");
        std::process::exit(0);
    })
}
