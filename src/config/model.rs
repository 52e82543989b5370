// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Mode;

/// Immutable specification for one command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Shell command text, run via `sh -c`.
    pub command: String,
    /// Working directory for the spawned process.
    pub work_dir: PathBuf,
    /// Attach the controlling stdin; otherwise stdin is null.
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>, work_dir: impl Into<PathBuf>, interactive: bool) -> Self {
        Self {
            command: command.into(),
            work_dir: work_dir.into(),
            interactive,
        }
    }
}

/// The three per-mode knobs: start command, on-change command, kill policy.
///
/// Empty strings mean "unset", matching the environment contract.
#[derive(Debug, Clone, Default)]
pub struct ModeCommands {
    pub start: String,
    pub on_change: String,
    /// Whether a detected change should terminate the running primary
    /// before the on-change command runs.
    pub kill_on_change: bool,
}

/// Fully resolved configuration, validated before the core starts.
#[derive(Debug, Clone)]
pub struct Settings {
    pub run: ModeCommands,
    pub debug: ModeCommands,
    pub test: ModeCommands,
    /// One-shot preparatory command; a failure here aborts startup.
    pub prep: String,
    /// Directories to watch recursively.
    pub watch_dirs: Vec<PathBuf>,
    /// Mount target directories, used as watch roots when `watch_dirs` is
    /// empty.
    pub mounts: Vec<PathBuf>,
    /// Path prefixes whose events are discarded.
    pub ignore_prefixes: Vec<String>,
    /// Inclusion regex; only matching paths trigger the on-change action.
    pub watch_regex: String,
    /// Polling interval for the change source.
    pub poll_interval: Duration,
    /// Working directory all commands run in.
    pub work_dir: PathBuf,
}

impl Settings {
    pub fn mode_commands(&self, mode: Mode) -> &ModeCommands {
        match mode {
            Mode::Run => &self.run,
            Mode::Debug => &self.debug,
            Mode::Test => &self.test,
        }
    }

    /// True when any mode has an on-change command configured.
    pub fn watching_configured(&self) -> bool {
        !self.run.on_change.is_empty()
            || !self.debug.on_change.is_empty()
            || !self.test.on_change.is_empty()
    }

    /// Watch roots, preferring the explicit watch dirs over the mounts.
    pub fn watch_roots(&self) -> &[PathBuf] {
        if !self.watch_dirs.is_empty() {
            &self.watch_dirs
        } else {
            &self.mounts
        }
    }

    /// Resolve the command set for the selected mode into a profile the
    /// supervisor can act on.
    pub fn profile(&self, mode: Mode, interactive: bool) -> ModeProfile {
        let commands = self.mode_commands(mode);
        let on_change = if commands.on_change.is_empty() {
            None
        } else {
            Some(CommandSpec::new(
                commands.on_change.clone(),
                self.work_dir.clone(),
                interactive,
            ))
        };
        ModeProfile {
            start: CommandSpec::new(commands.start.clone(), self.work_dir.clone(), interactive),
            on_change,
            kill_primary_on_change: commands.kill_on_change,
        }
    }

    /// Preparatory command spec, if one is configured.
    pub fn prep_spec(&self, interactive: bool) -> Option<CommandSpec> {
        if self.prep.is_empty() {
            None
        } else {
            Some(CommandSpec::new(
                self.prep.clone(),
                self.work_dir.clone(),
                interactive,
            ))
        }
    }
}

/// Per-mode view the supervisor is constructed with.
#[derive(Debug, Clone)]
pub struct ModeProfile {
    /// The primary workload command (may be empty; spawning an empty command
    /// is a warning, not an error).
    pub start: CommandSpec,
    /// The on-change action command; `None` disables watching.
    pub on_change: Option<CommandSpec>,
    pub kill_primary_on_change: bool,
}
