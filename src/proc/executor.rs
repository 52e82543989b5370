// src/proc/executor.rs

//! Spawning, waiting on, and killing managed commands.

use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use tracing::debug;

use crate::config::CommandSpec;
use crate::errors::{ProcwatchError, Result};
use crate::registry::{ProcessRecord, ProcessRole, RoleTable};

/// Delay between liveness probes while waiting for an interrupted process
/// to die.
pub const KILL_POLL_DELAY: Duration = Duration::from_secs(2);

/// Spawns shell commands as process-group leaders and implements the kill
/// protocol. Stateless; registry access always goes through the guard the
/// caller holds.
#[derive(Debug, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `spec` for `role` and record it in the role table before
    /// returning. The caller owns the returned [`Child`] and is responsible
    /// for waiting on it outside the registry lock.
    pub fn start(
        &self,
        table: &mut RoleTable,
        spec: &CommandSpec,
        role: ProcessRole,
    ) -> Result<Child> {
        debug!(%role, command = %spec.command, dir = ?spec.work_dir, "starting process");
        let child = shell_command(spec)
            .spawn()
            .map_err(|source| ProcwatchError::Spawn {
                command: spec.command.clone(),
                source,
            })?;
        let pid = child.id() as i32;
        table.set(role, ProcessRecord::live(pid));
        debug!(%role, pid, "new process group created");
        Ok(child)
    }

    /// Run a one-shot command (the preparatory command) to completion.
    ///
    /// Not tied to a role; a non-zero exit or spawn failure is returned and
    /// the caller escalates it to a fatal startup abort.
    pub async fn run_once(&self, spec: &CommandSpec) -> Result<()> {
        debug!(command = %spec.command, "running one-shot command");
        let child = shell_command(spec)
            .spawn()
            .map_err(|source| ProcwatchError::Spawn {
                command: spec.command.clone(),
                source,
            })?;
        let status = self.wait(child).await?;
        if !status.success() {
            return Err(ProcwatchError::Exit {
                code: exit_code(&status),
            });
        }
        Ok(())
    }

    /// Block on process exit from a dedicated OS thread.
    ///
    /// Never call this while holding the registry lock: an external kill of
    /// the same role must be able to proceed concurrently.
    pub async fn wait(&self, mut child: Child) -> Result<ExitStatus> {
        let result = tokio::task::spawn_blocking(move || child.wait()).await;
        match result {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(err)) => Err(anyhow::Error::from(err)
                .context("waiting for child process")
                .into()),
            Err(err) => Err(anyhow::Error::from(err)
                .context("wait task failed")
                .into()),
        }
    }

    /// Kill `role`'s process group.
    ///
    /// No-op when no process is recorded. Otherwise: probe liveness, send
    /// SIGINT to the whole group, and if `max_wait_attempts > 0` poll
    /// liveness at [`KILL_POLL_DELAY`] up to that many times, stopping as
    /// soon as the process is confirmed dead. The record is cleared
    /// unconditionally: a kill that failed to reap in time must not leave
    /// the registry claiming the process is alive when the supervisor is
    /// about to replace it.
    ///
    /// The returned error exists purely for logging; callers proceed with
    /// replacement regardless.
    pub async fn kill(
        &self,
        table: &mut RoleTable,
        role: ProcessRole,
        max_wait_attempts: u32,
    ) -> Result<()> {
        let record = table.get(role).clone();
        if record.is_empty() {
            debug!(%role, "no process recorded; kill is a no-op");
            return Ok(());
        }
        let pid = record.pid();
        debug!(%role, pid, "attempting to kill process group");

        let mut result = Ok(());
        if let Some(group) = record.group() {
            if !group.probe_alive() {
                debug!(%role, pid, "process already gone");
            } else {
                result = group.interrupt();
                for attempt in 0..max_wait_attempts {
                    if !group.probe_alive() {
                        break;
                    }
                    debug!(%role, pid, attempt, "process still alive after interrupt");
                    tokio::time::sleep(KILL_POLL_DELAY).await;
                }
            }
        }

        table.clear(role);
        result
    }
}

/// Map an exit status to the supervisor's notion of an exit code. A child
/// terminated by a signal carries no code; report failure.
pub fn exit_code(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

fn shell_command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&spec.command);
    cmd.current_dir(&spec.work_dir);
    cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    cmd.stdin(if spec.interactive {
        Stdio::inherit()
    } else {
        Stdio::null()
    });
    // Fresh process group with the child as leader: the group id equals the
    // child's pid, so one killpg reaches all of its descendants.
    cmd.process_group(0);
    cmd
}
