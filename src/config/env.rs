// src/config/env.rs

//! Environment variable resolution.
//!
//! The supervisor is configured entirely through `PROCWATCH_*` variables.
//! Parsing is split from `std::env` access so tests can feed a plain map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::model::{ModeCommands, Settings};
use crate::config::validate;
use crate::errors::{ProcwatchError, Result};

/// Default inclusion regex when `PROCWATCH_WATCH_REGEX` is unset.
pub const DEFAULT_WATCH_REGEX: &str = r"(^.*\.java$)|(^.*\.js$)|(^.*\.go$)";

/// Default poll interval in seconds.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 2;

/// Resolve settings from the process environment.
pub fn from_env() -> Result<Settings> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    let work_dir = std::env::current_dir()
        .map_err(|e| ProcwatchError::Config(format!("could not determine working dir: {e}")))?;
    from_env_map(&vars, work_dir)
}

/// Resolve settings from an explicit variable map (testable entry point).
pub fn from_env_map(vars: &HashMap<String, String>, work_dir: PathBuf) -> Result<Settings> {
    let get = |key: &str| vars.get(key).map(|s| s.trim().to_string()).unwrap_or_default();

    let run = ModeCommands {
        start: get("PROCWATCH_RUN"),
        on_change: get("PROCWATCH_RUN_ON_CHANGE"),
        kill_on_change: kill_flag(vars.get("PROCWATCH_RUN_KILL")),
    };
    let debug = ModeCommands {
        start: get("PROCWATCH_DEBUG"),
        on_change: get("PROCWATCH_DEBUG_ON_CHANGE"),
        kill_on_change: kill_flag(vars.get("PROCWATCH_DEBUG_KILL")),
    };
    let test = ModeCommands {
        start: get("PROCWATCH_TEST"),
        on_change: get("PROCWATCH_TEST_ON_CHANGE"),
        kill_on_change: kill_flag(vars.get("PROCWATCH_TEST_KILL")),
    };

    // PROCWATCH_INSTALL is the deprecated spelling of PROCWATCH_PREP.
    let mut prep = get("PROCWATCH_PREP");
    if prep.is_empty() {
        prep = get("PROCWATCH_INSTALL");
        if !prep.is_empty() {
            warn!("PROCWATCH_INSTALL is deprecated; use PROCWATCH_PREP");
        }
    }

    let mut watch_regex = get("PROCWATCH_WATCH_REGEX");
    if watch_regex.is_empty() {
        watch_regex = DEFAULT_WATCH_REGEX.to_string();
    }

    let settings = Settings {
        run,
        debug,
        test,
        prep,
        watch_dirs: split_paths(&get("PROCWATCH_WATCH_DIR")),
        mounts: parse_mounts(&get("PROCWATCH_MOUNTS"))?,
        ignore_prefixes: split_list(&get("PROCWATCH_WATCH_IGNORE_DIR")),
        watch_regex,
        poll_interval: parse_interval(vars.get("PROCWATCH_WATCH_INTERVAL")),
        work_dir,
    };

    debug!(?settings, "resolved environment configuration");
    validate::validate(&settings)?;
    Ok(settings)
}

/// Kill-policy truthiness: unset, empty or "true" (any case) means kill.
fn kill_flag(raw: Option<&String>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let trimmed = value.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("true")
        }
    }
}

/// Split a `;`-separated list, trimming entries and dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_paths(raw: &str) -> Vec<PathBuf> {
    split_list(raw).into_iter().map(PathBuf::from).collect()
}

/// Parse `local:container` mount entries; the watch root is the container
/// path. Windows may prepend a drive id to the local part
/// (`C:\work\src:/project/src`), so the path after the last `:` is taken.
fn parse_mounts(raw: &str) -> Result<Vec<PathBuf>> {
    let mut mounts = Vec::new();
    for entry in split_list(raw) {
        if !entry.contains(':') {
            return Err(ProcwatchError::Config(format!(
                "mount entry has bad formatting (expected local:container): {entry}"
            )));
        }
        let container = entry
            .rsplit(':')
            .next()
            .map(str::trim)
            .unwrap_or_default();
        mounts.push(PathBuf::from(container));
    }
    Ok(mounts)
}

/// Poll interval in whole seconds; invalid values fall back to the default
/// with a warning rather than aborting.
fn parse_interval(raw: Option<&String>) -> Duration {
    let secs = match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => DEFAULT_WATCH_INTERVAL_SECS,
        Some(trimmed) => match trimmed.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    value = trimmed,
                    default = DEFAULT_WATCH_INTERVAL_SECS,
                    "invalid watch interval; using default"
                );
                DEFAULT_WATCH_INTERVAL_SECS
            }
        },
    };
    Duration::from_secs(secs)
}
