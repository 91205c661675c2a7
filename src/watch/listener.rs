//! Dispatch loop: watcher events → endpoint handlers, on a worker thread.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam::channel::{Receiver, Sender, bounded};

use super::{DirWatcher, WatchError};
use crate::channel::Endpoint;
use crate::{debug, log};

/// Handle to a running dispatch loop.
///
/// Handlers run on the listener's thread, not the caller's. Dropping the
/// handle stops the loop and waits for the in-flight dispatch to finish.
pub struct Listener {
    dir: PathBuf,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Endpoint {
    /// Attach a watcher to the shared directory and start dispatching.
    ///
    /// Creates the directory if needed. Messages written before this call
    /// are not seen; follow with [`Endpoint::execute_within`] to pick them
    /// up. Attaching first and scanning second leaves no gap.
    pub fn listen(&self) -> Result<Listener, WatchError> {
        fs::create_dir_all(self.dir())
            .map_err(|e| WatchError::CreateDir(self.dir().to_path_buf(), e))?;
        let watcher = DirWatcher::new(self.dir())?;
        Listener::spawn(self.clone(), watcher)
    }
}

impl Listener {
    fn spawn(endpoint: Endpoint, watcher: DirWatcher) -> Result<Self, WatchError> {
        let dir = watcher.dir().to_path_buf();
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = std::thread::Builder::new()
            .name("mailslot-listener".into())
            .spawn(move || run(&endpoint, &watcher, &stop_rx))
            .map_err(WatchError::Spawn)?;

        debug!("watch"; "listening on {}", dir.display());
        Ok(Self {
            dir,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the loop has exited (shutdown, or the directory vanished).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the loop and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Disconnecting the stop channel wakes the loop
        self.stop_tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log!("watch"; "listener thread panicked");
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(endpoint: &Endpoint, watcher: &DirWatcher, stop_rx: &Receiver<()>) {
    loop {
        crossbeam::select! {
            recv(stop_rx) -> _ => break,
            recv(watcher.raw()) -> msg => {
                let Ok(result) = msg else {
                    break; // Watcher dropped
                };
                match result {
                    Ok(event) => {
                        for fs_event in watcher.classify(&event) {
                            debug!("watch"; "{}: {}", fs_event.kind.label(), fs_event.path.display());
                            endpoint.dispatch(&fs_event.path);
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
                if !watcher.dir().is_dir() {
                    log!("watch"; "{} disappeared, listener stopped", watcher.dir().display());
                    break;
                }
            }
        }
    }
}
