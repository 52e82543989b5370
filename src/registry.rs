// src/registry.rs

//! Role registry: the single source of truth for "what is currently running".
//!
//! The supervisor manages exactly two process identities, [`ProcessRole`],
//! each of which owns at most one live process at any instant. All reads and
//! writes of a [`ProcessRecord`] go through the registry lock; transitions
//! (kill-then-start) hold one guard across both the decision and the action
//! so that two concurrent transitions can never both conclude a role is dead
//! and both restart it.
//!
//! The lock is an async mutex: bounded kill-probe sleeps may happen while a
//! transition holds it, but blocking `wait()` on a child never does.

use std::fmt;

use tokio::sync::{Mutex, MutexGuard};

use crate::proc::group::ProcessGroupController;

/// One of the two managed process identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// The run/debug/test workload.
    Primary,
    /// The on-change command.
    Action,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Primary => write!(f, "primary"),
            ProcessRole::Action => write!(f, "action"),
        }
    }
}

/// What the registry knows about one role's process.
///
/// A pid of 0 is the sentinel for "no process currently owns this role".
#[derive(Debug, Clone, Default)]
pub struct ProcessRecord {
    pid: i32,
    group: Option<ProcessGroupController>,
}

impl ProcessRecord {
    /// Record for a role with no live process.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record for a just-spawned process-group leader.
    pub fn live(pid: i32) -> Self {
        Self {
            pid,
            group: Some(ProcessGroupController::new(pid)),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn is_empty(&self) -> bool {
        self.pid == 0
    }

    /// Controller for the process group, if a process is recorded.
    pub fn group(&self) -> Option<&ProcessGroupController> {
        self.group.as_ref()
    }

    /// Null-signal liveness probe. An empty record is never alive.
    pub fn probe_alive(&self) -> bool {
        self.group.as_ref().is_some_and(|g| g.probe_alive())
    }
}

/// The mapping from role to record. Only reachable through
/// [`RoleRegistry::lock`].
#[derive(Debug, Default)]
pub struct RoleTable {
    primary: ProcessRecord,
    action: ProcessRecord,
}

impl RoleTable {
    pub fn get(&self, role: ProcessRole) -> &ProcessRecord {
        match role {
            ProcessRole::Primary => &self.primary,
            ProcessRole::Action => &self.action,
        }
    }

    pub fn set(&mut self, role: ProcessRole, record: ProcessRecord) {
        match role {
            ProcessRole::Primary => self.primary = record,
            ProcessRole::Action => self.action = record,
        }
    }

    pub fn clear(&mut self, role: ProcessRole) {
        self.set(role, ProcessRecord::empty());
    }
}

/// Mutex-protected role table, constructed once at startup and shared as an
/// `Arc` between the supervisor, dispatcher and shutdown coordinator.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    inner: Mutex<RoleTable>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the registry guard. Transitions hold this across the whole
    /// decide-kill-spawn sequence; guard drop releases on every exit path.
    pub async fn lock(&self) -> MutexGuard<'_, RoleTable> {
        self.inner.lock().await
    }
}
