//! File watching for example recompilation.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// SCSS source was modified
    StylesheetModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Generic modification
    Modified(PathBuf),
}

impl WatchEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::StylesheetModified(p)
            | WatchEvent::Created(p)
            | WatchEvent::Deleted(p)
            | WatchEvent::Modified(p) => p,
        }
    }

    /// Whether the event should trigger a stylesheet rebuild.
    pub fn affects_stylesheets(&self) -> bool {
        match self {
            WatchEvent::StylesheetModified(_) => true,
            WatchEvent::Created(p) | WatchEvent::Deleted(p) => is_scss(p),
            WatchEvent::Modified(_) => false,
        }
    }
}

/// Quiet period that ends a burst of events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events. Paths that do not
    /// exist are skipped.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || forward_debounced(sync_rx, async_tx, DEBOUNCE));

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Collect events until `quiet` passes without another one, then forward the
/// whole batch. Returns once either side of the pipe closes.
fn forward_debounced(
    rx: mpsc::Receiver<notify::Event>,
    tx: async_mpsc::Sender<WatchEvent>,
    quiet: Duration,
) {
    let mut pending: Vec<WatchEvent> = Vec::new();

    loop {
        let next = if pending.is_empty() {
            rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(quiet)
        };

        match next {
            Ok(event) => {
                for path in &event.paths {
                    if let Some(e) = classify_event(path, &event.kind) {
                        if !pending.contains(&e) {
                            pending.push(e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                for e in pending.drain(..) {
                    if tx.blocking_send(e).is_err() {
                        return;
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                for e in pending.drain(..) {
                    if tx.blocking_send(e).is_err() {
                        break;
                    }
                }
                return;
            }
        }
    }
}

fn is_scss(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("scss")
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) if is_scss(path) => {
            Some(WatchEvent::StylesheetModified(path.to_path_buf()))
        }
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}
