// src/watch/mod.rs

//! Filesystem change plumbing.
//!
//! The supervision core only consumes a stream of already-filtered change
//! events; this module produces that stream:
//!
//! - [`filters`] compiles the inclusion regex and ignore prefixes.
//! - [`source`] registers recursive watches with a polling backend and
//!   forwards filtered events into a bounded channel.
//! - [`dispatcher`] turns each event into an independent
//!   `Supervisor::handle_change` task.

pub mod dispatcher;
pub mod filters;
pub mod source;

pub use dispatcher::ChangeDispatcher;
pub use filters::ChangeFilter;
pub use source::{ChangeEvent, WatcherHandle, spawn_change_source};
