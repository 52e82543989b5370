// src/proc/group.rs

//! Process-group signalling.
//!
//! Every managed command is spawned as the leader of a fresh process group,
//! so the group id equals the leader's pid and one `killpg` reaches the
//! leader and all of its descendants. This module wraps the raw signal
//! plumbing behind a small capability so the supervisor logic never sees
//! negative pids or signal numbers.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;

use crate::errors::ProcwatchError;

/// Capability over one process group, identified by its leader's pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGroupController {
    pgid: i32,
}

impl ProcessGroupController {
    /// The leader was spawned with `process_group(0)`, so its pid is the
    /// group id.
    pub fn new(leader_pid: i32) -> Self {
        Self { pgid: leader_pid }
    }

    pub fn pgid(&self) -> i32 {
        self.pgid
    }

    /// Null-signal probe of the group leader.
    ///
    /// ESRCH means the process is gone; any other error (e.g. EPERM) means
    /// it still exists.
    pub fn probe_alive(&self) -> bool {
        match kill(Pid::from_raw(self.pgid), None) {
            Ok(()) => true,
            Err(Errno::ESRCH) => false,
            Err(_) => true,
        }
    }

    /// Send SIGINT to the whole group so children inherit the shutdown
    /// signal.
    pub fn interrupt(&self) -> Result<(), ProcwatchError> {
        self.signal_group(Signal::SIGINT)
    }

    /// Send SIGKILL to the whole group.
    pub fn force_kill(&self) -> Result<(), ProcwatchError> {
        self.signal_group(Signal::SIGKILL)
    }

    fn signal_group(&self, signal: Signal) -> Result<(), ProcwatchError> {
        killpg(Pid::from_raw(self.pgid), signal).map_err(|source| ProcwatchError::Kill {
            pgid: self.pgid,
            source,
        })
    }
}
