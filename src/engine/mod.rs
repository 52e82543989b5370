// src/engine/mod.rs

//! Supervision engine.
//!
//! - [`supervisor`] owns the role-transition state machine: starting the
//!   primary, reacting to change events, killing roles.
//! - [`shutdown`] listens for OS termination signals and drives the orderly
//!   kill-both-roles-then-reap-then-exit sequence.

pub mod shutdown;
pub mod supervisor;

pub use shutdown::{spawn_shutdown_coordinator, wait_for_shutdown_signal};
pub use supervisor::Supervisor;
