// src/watch/source.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{CreateKind, RemoveKind};
use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{ProcwatchError, Result};
use crate::watch::filters::ChangeFilter;

/// Cap on buffered qualifying events; a burst beyond this is coalesced by
/// dropping the excess.
pub const DEFAULT_MAX_PENDING_EVENTS: usize = 1;

/// One qualifying filesystem change.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
}

/// Keeps the underlying watcher alive; dropping this handle stops file
/// watching.
pub struct WatcherHandle {
    _inner: PollWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Start the polling change source.
///
/// The filter is fixed before any root is registered, so the initial scan
/// burst cannot slip through unfiltered. Roots that do not exist or fail to
/// register are warnings and watching continues for the rest; failure to
/// construct the watcher itself is fatal.
pub fn spawn_change_source(
    roots: &[PathBuf],
    filter: ChangeFilter,
    poll_interval: Duration,
    max_pending: usize,
) -> Result<(WatcherHandle, mpsc::Receiver<ChangeEvent>)> {
    // Bridge from the watcher's callback thread into the async world.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();

    let notify_config = Config::default().with_poll_interval(poll_interval);
    let mut watcher = PollWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = raw_tx.send(event);
            }
            Err(err) => {
                // tracing may not be usable on this thread; stderr is.
                eprintln!("procwatch: file watch error: {err}");
            }
        },
        notify_config,
    )
    .map_err(|err| ProcwatchError::WatchSetup(format!("could not start the watcher: {err}")))?;

    for root in roots {
        if !root.exists() {
            warn!(path = ?root, "directory specified for file watching does not exist");
        }
        if let Err(err) = watcher.watch(root, RecursiveMode::Recursive) {
            warn!(path = ?root, error = %err, "failed to add directory to recursive watching");
        }
    }
    info!(?roots, poll_interval = ?poll_interval, "file watcher started");

    let (tx, rx) = mpsc::channel::<ChangeEvent>(max_pending.max(1));
    tokio::spawn(async move {
        while let Some(event) = raw_rx.recv().await {
            let kind = event.kind;
            for path in event.paths {
                if !filter.matches(&path, event_targets_directory(&kind, &path)) {
                    continue;
                }
                debug!(path = ?path, "file change event detected");
                if tx.try_send(ChangeEvent { path }).is_err() {
                    debug!("pending change events at cap; coalescing");
                }
            }
        }
        debug!("change source loop finished");
    });

    Ok((WatcherHandle { _inner: watcher }, rx))
}

/// Classify an event's target as a directory.
///
/// A removed directory no longer stats, so the event kind is consulted
/// first and the filesystem only as a fallback. Backends that report
/// removals as `RemoveKind::Any` still fall through to the stat; those
/// events are then gated by the inclusion regex alone.
pub fn event_targets_directory(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => false,
        _ => path.is_dir(),
    }
}
