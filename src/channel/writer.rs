//! Message writer.
//!
//! Best-effort notify: drop `<COMMAND>.<ext>` into the shared directory and
//! let the other side's watcher pick it up. Persistent failures are logged
//! and swallowed; there is no acknowledgment path back to the sender.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::command::CommandId;
use super::retry::RetryPolicy;
use crate::{debug, log};

/// Write `payload` as the entire content of the command's message file.
///
/// Creates the directory if needed and overwrites any previous message for
/// the same command. Every kind of I/O error is retried, including ones
/// unlikely to be transient. Returns the written path on success.
pub fn write_message(
    dir: &Path,
    command: &CommandId,
    extension: &str,
    payload: &str,
    policy: &RetryPolicy,
) -> Option<PathBuf> {
    let path = dir.join(command.file_name(extension));

    let result = policy.run(|attempt| {
        write_once(dir, &path, payload).inspect_err(|e| {
            debug!("send"; "attempt {} on {} failed: {}", attempt + 1, path.display(), e);
        })
    });

    match result {
        Ok(()) => {
            debug!("send"; "{} ({} bytes)", path.display(), payload.len());
            Some(path)
        }
        Err(e) => {
            log!("send"; "dropped {}: {}", command, e);
            None
        }
    }
}

fn write_once(dir: &Path, path: &Path, payload: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(path, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::fixed(3, Duration::from_millis(1))
    }

    #[test]
    fn test_writes_canonical_file_name() {
        let dir = TempDir::new().unwrap();
        let path = write_message(
            dir.path(),
            &CommandId::new("set_search"),
            "txt",
            "hello",
            &fast_policy(),
        )
        .unwrap();

        assert_eq!(path, dir.path().join("SET_SEARCH.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_overwrites_previous_message() {
        let dir = TempDir::new().unwrap();
        let id = CommandId::new("SET_SEARCH");
        write_message(dir.path(), &id, "txt", "a much longer first payload", &fast_policy());
        let path = write_message(dir.path(), &id, "txt", "short", &fast_policy()).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "short");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("Vendor").join("IPC");

        let path = write_message(
            &nested,
            &CommandId::new("VS_PROJECT"),
            "txt",
            "{}",
            &fast_policy(),
        );

        assert!(path.is_some());
        assert!(nested.join("VS_PROJECT.txt").is_file());
    }

    #[test]
    fn test_gives_up_silently() {
        let dir = TempDir::new().unwrap();
        // A regular file where the directory should be: create_dir_all fails
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();

        let path = write_message(
            &blocker,
            &CommandId::new("SET_SEARCH"),
            "txt",
            "hello",
            &fast_policy(),
        );
        assert!(path.is_none());
    }
}
