//! Directory watcher
//!
//! Watches the shared directory (non-recursively) and turns notify events
//! into [`FsEvent`]s, which the [`Listener`] feeds to
//! [`Endpoint::dispatch`](crate::channel::Endpoint::dispatch).
//!
//! Architecture:
//! ```text
//! notify callback → crossbeam channel → classify → Endpoint::dispatch
//!                   (notify thread)     (listener worker thread)
//! ```
//!
//! No debouncing: one write may surface as a create and a modify, and both
//! are dispatched. Handlers are expected to tolerate reading the same
//! content twice.

mod error;
mod listener;
mod types;


use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, unbounded};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

pub use error::WatchError;
pub use listener::Listener;
pub use types::{ChangeKind, FsEvent};

/// Live watch on one directory.
///
/// Dropping it deregisters the OS watch.
pub struct DirWatcher {
    dir: WatchedDir,
    events: Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
}

impl DirWatcher {
    /// Start watching `dir`, which must already exist.
    pub fn new(dir: &Path) -> Result<Self, WatchError> {
        if !dir.is_dir() {
            return Err(WatchError::MissingDir(dir.to_path_buf()));
        }

        // Sync channel for notify (it calls back on its own thread)
        let (tx, rx) = unbounded();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            dir: WatchedDir::new(dir),
            events: rx,
            _watcher: watcher,
        })
    }

    /// The watched directory, as given.
    pub fn dir(&self) -> &Path {
        &self.dir.given
    }

    /// Raw notify results, for callers that `select!` over several channels.
    pub(crate) fn raw(&self) -> &Receiver<notify::Result<notify::Event>> {
        &self.events
    }

    /// Wait up to `timeout` for the next notification.
    ///
    /// Returns `None` on timeout or once the watcher is gone. A notification
    /// may classify to zero events (e.g. access events), hence the `Vec`.
    pub fn next_events(&self, timeout: Duration) -> Option<Vec<FsEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(Ok(event)) => Some(self.classify(&event)),
            Ok(Err(e)) => {
                crate::log!("watch"; "notify error: {}", e);
                Some(Vec::new())
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Map a notify event to the file events it reports in this directory.
    pub fn classify(&self, event: &notify::Event) -> Vec<FsEvent> {
        classify(event, &self.dir)
    }
}

/// Watched directory under both its given and canonical spelling.
///
/// Some backends report canonical paths (`/private/var/...` on macOS) while
/// others echo the path that was registered.
#[derive(Debug, Clone)]
struct WatchedDir {
    given: PathBuf,
    canonical: PathBuf,
}

impl WatchedDir {
    fn new(dir: &Path) -> Self {
        Self {
            given: dir.to_path_buf(),
            canonical: dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()),
        }
    }

    /// Whether `path` is a direct child of the directory.
    fn contains(&self, path: &Path) -> bool {
        path.parent()
            .is_some_and(|parent| parent == self.given || parent == self.canonical)
    }
}

fn classify(event: &notify::Event, dir: &WatchedDir) -> Vec<FsEvent> {
    let (kind, paths): (ChangeKind, &[PathBuf]) = match event.kind {
        EventKind::Create(_) => (ChangeKind::Created, event.paths.as_slice()),
        EventKind::Remove(_) => (ChangeKind::Removed, event.paths.as_slice()),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            // Old name, or the From+To pair whose To half arrives separately
            RenameMode::From | RenameMode::Both => return Vec::new(),
            // Report only the resulting path
            _ => match event.paths.last() {
                Some(last) => (ChangeKind::Renamed, std::slice::from_ref(last)),
                None => return Vec::new(),
            },
        },
        EventKind::Modify(_) => (ChangeKind::Modified, event.paths.as_slice()),
        _ => return Vec::new(),
    };

    paths
        .iter()
        .filter(|path| dir.contains(path))
        .map(|path| FsEvent {
            path: path.clone(),
            kind,
        })
        .collect()
}
