// src/config/mod.rs

//! Configuration resolution.
//!
//! All configuration comes from `PROCWATCH_*` environment variables,
//! resolved once at startup into a typed [`Settings`] value. Validation
//! failures are fatal before the supervisor core ever starts.
//!
//! - [`model`] holds the typed structures ([`Settings`], [`ModeProfile`],
//!   [`CommandSpec`]).
//! - [`env`] reads and parses the environment.
//! - [`validate`] rejects unusable configurations.

pub mod env;
pub mod model;
pub mod validate;

pub use env::{from_env, from_env_map};
pub use model::{CommandSpec, ModeCommands, ModeProfile, Settings};
