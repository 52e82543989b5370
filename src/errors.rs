// src/errors.rs

//! Crate-wide error taxonomy and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A managed process ran and exited non-zero.
    ///
    /// Fatal only for the preparatory command and the synchronous
    /// (unwatched) primary run; logged everywhere else.
    #[error("Process exited with status {code}")]
    Exit { code: i32 },

    /// Signal delivery to a process group failed. Never fatal; the registry
    /// entry is cleared regardless.
    #[error("Failed to signal process group {pgid}: {source}")]
    Kill {
        pgid: i32,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Watch setup error: {0}")]
    WatchSetup(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProcwatchError>;
