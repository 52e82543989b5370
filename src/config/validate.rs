// src/config/validate.rs

use tracing::debug;

use crate::config::model::Settings;
use crate::errors::{ProcwatchError, Result};

/// Reject configurations the core cannot run with.
///
/// - At least one of the three start commands must be set.
/// - If any on-change command is set, file watching is enabled and there
///   must be somewhere to watch (watch dirs or mounts).
///
/// A selected mode whose own start command is empty is only warned about
/// later; the other modes' commands may still be the operator's intent.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.run.start.is_empty()
        && settings.debug.start.is_empty()
        && settings.test.start.is_empty()
    {
        return Err(ProcwatchError::Config(
            "PROCWATCH_RUN, PROCWATCH_DEBUG and PROCWATCH_TEST cannot all be empty".to_string(),
        ));
    }

    if !settings.watching_configured() {
        debug!("file watching is not enabled");
        return Ok(());
    }

    if settings.watch_dirs.is_empty() && settings.mounts.is_empty() {
        return Err(ProcwatchError::Config(
            "file watching is enabled but PROCWATCH_WATCH_DIR and PROCWATCH_MOUNTS are both empty"
                .to_string(),
        ));
    }

    Ok(())
}
