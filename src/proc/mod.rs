// src/proc/mod.rs

//! Process layer.
//!
//! Everything that touches the OS process table lives here:
//!
//! - [`group`] owns the process-group capability (probe / interrupt /
//!   force-kill an entire group).
//! - [`executor`] spawns shell commands as process-group leaders, records
//!   them in the role registry, and implements the kill protocol.
//! - [`reaper`] is the bounded non-blocking loop that collects exited
//!   descendants so the host never accumulates zombies.
//!
//! Children are spawned with `std::process::Command` and waited on from
//! blocking tasks, one OS thread per wait; the registry lock is never held
//! while a wait is in flight.

pub mod executor;
pub mod group;
pub mod reaper;

pub use executor::CommandExecutor;
pub use group::ProcessGroupController;
