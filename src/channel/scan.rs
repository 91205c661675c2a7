//! Catch-up scan.
//!
//! Lists messages whose last write falls inside a recent window so they can
//! be replayed through the normal dispatch path. Nothing is marked as
//! processed: overlapping scans replay the same file again.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::log;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Whether `mtime` lies in `[now - window, now]`.
pub fn is_within(mtime: SystemTime, now: SystemTime, window: Duration) -> bool {
    now.duration_since(mtime)
        .map(|age| age <= window)
        .unwrap_or(false)
}

/// Files directly inside `dir` last written within `window` before `now`.
///
/// Sorted oldest first. Subdirectories are skipped; an unreadable directory
/// yields an empty list.
pub fn recent_messages(dir: &Path, now: SystemTime, window: Duration) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log!("scan"; "cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut recent: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| {
            let path = entry.path();
            let mtime = get_mtime(&path)?;
            is_within(mtime, now, window).then_some((mtime, path))
        })
        .collect();

    recent.sort();
    recent.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mtime: SystemTime) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        path
    }

    #[test]
    fn test_is_within_bounds() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let window = Duration::from_secs(10);

        assert!(is_within(now, now, window));
        assert!(is_within(now - window, now, window));
        assert!(!is_within(now - window - Duration::from_secs(1), now, window));
        // Newer than the reference time is outside the window
        assert!(!is_within(now + Duration::from_secs(1), now, window));
    }

    #[test]
    fn test_selects_only_recent_files() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();

        let fresh = touch(dir.path(), "SET_SEARCH.txt", now - Duration::from_secs(2));
        let older = touch(dir.path(), "SET_REPLACE.txt", now - Duration::from_secs(29));
        touch(dir.path(), "VS_PROJECT.txt", now - Duration::from_secs(31));
        touch(dir.path(), "VS_SOLUTION.txt", now - Duration::from_secs(3_600));
        touch(dir.path(), "FUTURE.txt", now + Duration::from_secs(60));

        let found = recent_messages(dir.path(), now, Duration::from_secs(30));
        assert_eq!(found, vec![older, fresh]);
    }

    #[test]
    fn test_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("SUBDIR")).unwrap();

        let found = recent_messages(dir.path(), SystemTime::now(), Duration::from_secs(60));
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let found = recent_messages(
            &dir.path().join("gone"),
            SystemTime::now(),
            Duration::from_secs(60),
        );
        assert!(found.is_empty());
    }
}
