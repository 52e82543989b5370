// src/watch/filters.rs

use std::path::Path;

use regex::Regex;

use crate::config::Settings;
use crate::errors::{ProcwatchError, Result};

/// Path filtering policy for change events.
///
/// A path qualifies when it is not a directory, does not start with any
/// ignored prefix, and matches the inclusion regex. Compiled up front,
/// before any watch is registered, so a bad pattern aborts startup instead
/// of surfacing mid-watch.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    include: Regex,
    ignore: Vec<Regex>,
}

impl ChangeFilter {
    pub fn new(include_pattern: &str, ignore_prefixes: &[String]) -> Result<Self> {
        let include = Regex::new(include_pattern).map_err(|err| {
            ProcwatchError::Config(format!(
                "invalid inclusion regex '{include_pattern}': {err}"
            ))
        })?;

        let mut ignore = Vec::with_capacity(ignore_prefixes.len());
        for prefix in ignore_prefixes {
            // Anchored so the prefix only matches at the start of the path.
            let pattern = format!("^{prefix}");
            let compiled = Regex::new(&pattern).map_err(|err| {
                ProcwatchError::Config(format!("invalid ignore prefix '{prefix}': {err}"))
            })?;
            ignore.push(compiled);
        }

        Ok(Self { include, ignore })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.watch_regex, &settings.ignore_prefixes)
    }

    /// Whether a change at `path` should trigger the on-change action.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        if is_dir {
            return false;
        }
        let text = path.to_string_lossy();
        if self.ignore.iter().any(|re| re.is_match(&text)) {
            return false;
        }
        self.include.is_match(&text)
    }
}
