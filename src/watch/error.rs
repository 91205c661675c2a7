//! Watcher error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to set up the receive side of a channel end.
///
/// Fatal for that end: nothing retries or re-attaches the watch.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("shared directory `{0}` does not exist")]
    MissingDir(PathBuf),

    #[error("cannot create shared directory `{0}`")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("failed to watch shared directory")]
    Notify(#[from] notify::Error),

    #[error("failed to spawn listener thread")]
    Spawn(#[source] std::io::Error),
}
