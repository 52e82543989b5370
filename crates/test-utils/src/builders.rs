#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use procwatch::config::{CommandSpec, ModeCommands, ModeProfile, Settings};

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings {
                run: ModeCommands::default(),
                debug: ModeCommands::default(),
                test: ModeCommands::default(),
                prep: String::new(),
                watch_dirs: vec![],
                mounts: vec![],
                ignore_prefixes: vec![],
                watch_regex: ".*".to_string(),
                poll_interval: Duration::from_secs(2),
                work_dir: PathBuf::from("."),
            },
        }
    }

    pub fn run(mut self, cmd: &str) -> Self {
        self.settings.run.start = cmd.to_string();
        self
    }

    pub fn run_on_change(mut self, cmd: &str) -> Self {
        self.settings.run.on_change = cmd.to_string();
        self
    }

    pub fn run_kill(mut self, kill: bool) -> Self {
        self.settings.run.kill_on_change = kill;
        self
    }

    pub fn prep(mut self, cmd: &str) -> Self {
        self.settings.prep = cmd.to_string();
        self
    }

    pub fn watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.watch_dirs.push(dir.into());
        self
    }

    pub fn ignore_prefix(mut self, prefix: &str) -> Self {
        self.settings.ignore_prefixes.push(prefix.to_string());
        self
    }

    pub fn watch_regex(mut self, pattern: &str) -> Self {
        self.settings.watch_regex = pattern.to_string();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.work_dir = dir.into();
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ModeProfile`, for driving the supervisor directly without
/// going through environment resolution.
pub struct ProfileBuilder {
    start: String,
    on_change: Option<String>,
    kill_primary_on_change: bool,
    work_dir: PathBuf,
}

impl ProfileBuilder {
    pub fn new(start: &str) -> Self {
        Self {
            start: start.to_string(),
            on_change: None,
            kill_primary_on_change: true,
            work_dir: PathBuf::from("."),
        }
    }

    pub fn on_change(mut self, cmd: &str) -> Self {
        self.on_change = Some(cmd.to_string());
        self
    }

    pub fn kill_primary(mut self, kill: bool) -> Self {
        self.kill_primary_on_change = kill;
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn build(self) -> ModeProfile {
        ModeProfile {
            start: CommandSpec::new(self.start, self.work_dir.clone(), false),
            on_change: self
                .on_change
                .map(|cmd| CommandSpec::new(cmd, self.work_dir.clone(), false)),
            kill_primary_on_change: self.kill_primary_on_change,
        }
    }
}

/// Build a variable map for `config::from_env_map`.
pub fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
