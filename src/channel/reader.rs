//! Message reader.
//!
//! Reads the full payload of a message file that the writing side may still
//! hold open, or that may be momentarily absent mid-rename.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::retry::RetryPolicy;
use crate::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read the whole file as text, retrying on any I/O failure.
///
/// Returns `None` once the retry budget is exhausted. An empty file is a
/// valid (empty) payload.
pub fn read_message(path: &Path, policy: &RetryPolicy) -> Option<String> {
    let result = policy.run(|attempt| {
        read_once(path).inspect_err(|e| {
            debug!("read"; "attempt {} on {} failed: {}", attempt + 1, path.display(), e);
        })
    });

    match result {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("read"; "giving up on {}: {}", path.display(), e);
            None
        }
    }
}

/// Open for shared reading and slurp the file.
fn read_once(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode_payload(&bytes))
}

/// Decode file bytes as UTF-8, dropping a leading BOM.
///
/// Invalid sequences are replaced rather than rejected: the payload is
/// opaque text and a half-decoded message is still worth handing over.
pub fn decode_payload(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::fixed(10, Duration::from_millis(20))
    }

    #[test]
    fn test_reads_full_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SET_SEARCH.txt");
        std::fs::write(&path, "hello\nworld").unwrap();

        assert_eq!(
            read_message(&path, &fast_policy()).as_deref(),
            Some("hello\nworld")
        );
    }

    #[test]
    fn test_empty_file_is_empty_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SET_SEARCH.txt");
        std::fs::write(&path, "").unwrap();

        assert_eq!(read_message(&path, &fast_policy()).as_deref(), Some(""));
    }

    #[test]
    fn test_missing_file_yields_none_after_budget() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("NOPE.txt");

        let start = Instant::now();
        assert_eq!(read_message(&path, &fast_policy()), None);
        assert!(start.elapsed() >= fast_policy().budget());
    }

    #[test]
    fn test_file_appearing_within_budget_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SET_REPLACE.txt");

        let late = path.clone();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(60));
            std::fs::write(&late, "late payload").unwrap();
        });

        let text = read_message(&path, &fast_policy());
        writer.join().unwrap();
        assert_eq!(text.as_deref(), Some("late payload"));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_payload(b"\xEF\xBB\xBFhello"), "hello");
        assert_eq!(decode_payload(b"hello"), "hello");
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        assert_eq!(decode_payload(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_unicode_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SET_SEARCH.txt");
        std::fs::write(&path, "naïve ✓ 検索").unwrap();
        assert_eq!(
            read_message(&path, &fast_policy()).as_deref(),
            Some("naïve ✓ 検索")
        );
    }
}
