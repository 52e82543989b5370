// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod proc;
pub mod registry;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::engine::Supervisor;
use crate::errors::Result;
use crate::proc::CommandExecutor;
use crate::registry::RoleRegistry;
use crate::watch::source::DEFAULT_MAX_PENDING_EVENTS;
use crate::watch::{ChangeDispatcher, ChangeFilter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration resolution from the environment
/// - the role registry and supervisor
/// - the shutdown coordinator
/// - the preparatory command
/// - (optional) the file watcher and change dispatcher
///
/// Returns the supervisor's exit code: the primary's own code when run
/// without watching, 0 when the watcher stream ends. Graceful
/// signal-triggered shutdown exits 0 from the coordinator itself; fatal
/// startup errors surface as `Err` and become exit code 1.
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = config::from_env()?;
    let profile = settings.profile(args.mode, args.interactive);

    if profile.start.command.is_empty() {
        warn!(mode = ?args.mode, "no start command is configured for the selected mode");
    }
    if args.no_watcher {
        info!("file watching has been turned off on the command line");
    }
    let watching = profile.on_change.is_some() && !args.no_watcher;

    let registry = Arc::new(RoleRegistry::new());
    let supervisor = Arc::new(Supervisor::new(registry, profile));

    // Independent entry point into the same supervisor: signal-driven
    // shutdown can fire at any point from here on.
    engine::spawn_shutdown_coordinator(Arc::clone(&supervisor));

    if let Some(prep) = settings.prep_spec(args.interactive) {
        info!(command = %prep.command, "running preparatory command");
        if let Err(err) = CommandExecutor::new().run_once(&prep).await {
            error!(error = %err, "preparatory command failed; exiting");
            return Err(err);
        }
    }

    if !watching {
        debug!("no on-change command configured or watching disabled");
        return supervisor.start_primary_once().await;
    }

    supervisor.spawn_primary();

    // The filter compiles before any watch is registered.
    let filter = ChangeFilter::from_settings(&settings)?;
    let (_watcher_handle, events) = watch::spawn_change_source(
        settings.watch_roots(),
        filter,
        settings.poll_interval,
        DEFAULT_MAX_PENDING_EVENTS,
    )?;

    ChangeDispatcher::new(Arc::clone(&supervisor)).run(events).await;
    Ok(0)
}
