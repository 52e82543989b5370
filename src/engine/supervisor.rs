// src/engine/supervisor.rs

//! Role-transition logic.
//!
//! The supervisor's state is implicit in the role registry: primary
//! alive/dead crossed with action alive/dead. Every transition brackets its
//! decisions and registry mutations with one lock acquisition; waiting on a
//! spawned process always happens after the guard is dropped, so a
//! transition can begin and complete while an older process's wait is still
//! pending.

use std::process::{Child, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::config::{CommandSpec, ModeProfile};
use crate::errors::Result;
use crate::proc::executor::{self, CommandExecutor};
use crate::proc::reaper::{self, DEFAULT_REAP_POLLS};
use crate::registry::{ProcessRole, RoleRegistry};

/// How many 2 s liveness polls to grant a previous action before its
/// replacement starts. Keeps two action processes from ever being live at
/// once.
const ACTION_REPLACE_WAIT_ATTEMPTS: u32 = 2;

/// Orchestrates role transitions over the shared registry.
pub struct Supervisor {
    registry: Arc<RoleRegistry>,
    executor: CommandExecutor,
    profile: ModeProfile,
    shutting_down: AtomicBool,
}

impl Supervisor {
    pub fn new(registry: Arc<RoleRegistry>, profile: ModeProfile) -> Self {
        Self {
            registry,
            executor: CommandExecutor::new(),
            profile,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Mark shutdown as in progress. Once set, a signal-terminated primary
    /// counts as a clean exit rather than a failure, so the coordinator's
    /// exit 0 cannot race a synchronous run reporting 1 for the same kill.
    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    /// Run the primary synchronously (no watcher active) and return its exit
    /// code, which becomes the supervisor's own exit code.
    ///
    /// This is the one transition where failures are fatal: the invocation
    /// is the operator's explicit one-time intent.
    pub async fn start_primary_once(&self) -> Result<i32> {
        info!(command = %self.profile.start.command, "running primary synchronously");
        let child = {
            let mut table = self.registry.lock().await;
            self.executor
                .start(&mut table, &self.profile.start, ProcessRole::Primary)?
        };

        let waited = self.wait_and_clear(child, ProcessRole::Primary).await;
        // Stray children are collected before the exit code is surfaced.
        reaper::reap(DEFAULT_REAP_POLLS).await;

        let status = waited?;
        if status.code().is_none() && self.is_shutting_down() {
            info!("primary was terminated as part of shutdown");
            return Ok(0);
        }
        let code = executor::exit_code(&status);
        if code != 0 {
            error!(code, "primary exited non-zero");
        }
        Ok(code)
    }

    /// Start the primary on a background task (watcher active). A spawn
    /// failure or non-zero exit is logged only; the supervisor stays alive
    /// awaiting further change events.
    pub fn spawn_primary(self: &Arc<Self>) {
        let supervisor = Arc::clone(self);
        info!(command = %supervisor.profile.start.command, "starting primary");
        tokio::spawn(async move {
            let child = {
                let mut table = supervisor.registry.lock().await;
                match supervisor.executor.start(
                    &mut table,
                    &supervisor.profile.start,
                    ProcessRole::Primary,
                ) {
                    Ok(child) => child,
                    Err(err) => {
                        warn!(error = %err, "failed to start primary");
                        return;
                    }
                }
            };
            match supervisor.wait_and_clear(child, ProcessRole::Primary).await {
                Ok(status) if !status.success() => info!(
                    code = executor::exit_code(&status),
                    "primary exited non-zero; awaiting further changes"
                ),
                Ok(_) => debug!("primary exited cleanly"),
                Err(err) => warn!(error = %err, "waiting on primary failed"),
            }
        });
    }

    /// React to one qualifying filesystem change.
    ///
    /// With the kill policy on, both the primary and any previous action are
    /// interrupted without waiting on their death. With it off, only the
    /// previous action is killed, with a bounded wait so its replacement
    /// never overlaps it; a primary that died on its own is then resurrected
    /// with the original start command instead of running the action.
    pub async fn handle_change(self: Arc<Self>) {
        let Some(on_change) = self.profile.on_change.clone() else {
            return;
        };

        let mut table = self.registry.lock().await;

        if self.profile.kill_primary_on_change {
            debug!("kill policy is on; interrupting the primary");
            if let Err(err) = self
                .executor
                .kill(&mut table, ProcessRole::Primary, 0)
                .await
            {
                warn!(error = %err, "killing the primary returned an error");
            }
            if let Err(err) = self.executor.kill(&mut table, ProcessRole::Action, 0).await {
                warn!(error = %err, "killing the previous action returned an error");
            }
        } else if let Err(err) = self
            .executor
            .kill(&mut table, ProcessRole::Action, ACTION_REPLACE_WAIT_ATTEMPTS)
            .await
        {
            warn!(error = %err, "killing the previous action returned an error");
        }

        // Descendants of the just-killed groups are collected concurrently.
        tokio::spawn(reaper::reap(DEFAULT_REAP_POLLS));

        let (spec, role): (CommandSpec, ProcessRole) = if !self.profile.kill_primary_on_change
            && !table.get(ProcessRole::Primary).probe_alive()
        {
            // Without this, no change event would ever bring a crashed
            // primary back when the kill policy is off.
            info!("primary is not running; restarting it with the start command");
            (self.profile.start.clone(), ProcessRole::Primary)
        } else {
            (on_change, ProcessRole::Action)
        };

        let child = match self.executor.start(&mut table, &spec, role) {
            Ok(child) => child,
            Err(err) => {
                warn!(%role, error = %err, "failed to start process for change");
                return;
            }
        };
        drop(table);

        match self.wait_and_clear(child, role).await {
            Ok(status) if !status.success() => warn!(
                %role,
                code = executor::exit_code(&status),
                "process exited non-zero"
            ),
            Ok(_) => debug!(%role, "process exited cleanly"),
            Err(err) => warn!(%role, error = %err, "waiting on process failed"),
        }
    }

    /// Kill one role with a bounded wait; entry point for the shutdown
    /// coordinator. The returned error is for logging only.
    pub async fn kill_role(&self, role: ProcessRole, max_wait_attempts: u32) -> Result<()> {
        let mut table = self.registry.lock().await;
        self.executor.kill(&mut table, role, max_wait_attempts).await
    }

    /// Wait for the process on a blocking thread, then clear the role's
    /// record if this process still owns it (a newer transition may have
    /// replaced the record already).
    async fn wait_and_clear(&self, child: Child, role: ProcessRole) -> Result<ExitStatus> {
        let pid = child.id() as i32;
        let result = self.executor.wait(child).await;

        let mut table = self.registry.lock().await;
        if table.get(role).pid() == pid {
            table.clear(role);
        }
        drop(table);

        result
    }
}
