// src/proc/reaper.rs

//! Zombie reaping.
//!
//! When a managed process group is killed, descendants that were reassigned
//! to the supervisor exit asynchronously and must have their statuses
//! collected. [`reap`] polls non-blockingly for any exited child; it is
//! host-wide cleanup and claims no role lock, so it is safe to run
//! concurrently with kills and transitions.

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// Sleep between empty polls; reassigned descendants may take a moment to
/// show up.
const REAP_IDLE_DELAY: Duration = Duration::from_millis(200);

/// Poll budget used by the standard post-kill and shutdown passes.
pub const DEFAULT_REAP_POLLS: u32 = 5;

/// Collect exited children, polling at most `max_polls` times.
///
/// Stops early when a signal interrupts the wait or when no children exist
/// at all. The budget caps every iteration, so the loop terminates within
/// `max_polls` polls even if children keep appearing.
pub async fn reap(max_polls: u32) {
    let mut polls = 0u32;
    loop {
        if polls >= max_polls {
            debug!(max_polls, "reaper poll budget exhausted");
            break;
        }
        polls += 1;

        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                debug!("no child has a pending status; reaper sleeping");
                tokio::time::sleep(REAP_IDLE_DELAY).await;
            }
            Ok(status) => {
                debug!(?status, "reaped child");
            }
            Err(Errno::EINTR) => {
                debug!("reaper interrupted by signal");
                break;
            }
            Err(Errno::ECHILD) => {
                debug!("no child processes left");
                break;
            }
            Err(err) => {
                warn!(error = %err, "unexpected error while reaping");
                break;
            }
        }
    }
}
