//! Command identifiers.
//!
//! A message file's base name *is* its command. Identifiers are compared
//! case-insensitively by normalizing to upper case on construction.

use std::fmt;
use std::path::Path;

/// Canonical (upper-cased) command name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(String);

impl CommandId {
    pub fn new(name: &str) -> Self {
        Self(name.to_uppercase())
    }

    /// Derive the command from a message path: file name without its
    /// extension, upper-cased.
    ///
    /// Returns `None` for paths without a (UTF-8) file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self::new(stem))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name this command is written under, e.g. `SET_SEARCH.txt`.
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{}", self.0, extension)
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CommandId {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalizes_case() {
        assert_eq!(CommandId::new("set_search"), CommandId::new("SET_SEARCH"));
        assert_eq!(CommandId::new("Set_Search").as_str(), "SET_SEARCH");
    }

    #[test]
    fn test_from_path_strips_extension() {
        let id = CommandId::from_path(Path::new("/tmp/ipc/set_search.txt")).unwrap();
        assert_eq!(id.as_str(), "SET_SEARCH");

        // Only the last extension is removed
        let id = CommandId::from_path(Path::new("/tmp/ipc/SET_SEARCH.txt.tmp")).unwrap();
        assert_eq!(id.as_str(), "SET_SEARCH.TXT");

        let id = CommandId::from_path(Path::new("VS_PROJECT")).unwrap();
        assert_eq!(id.as_str(), "VS_PROJECT");
    }

    #[test]
    fn test_from_path_without_name() {
        assert!(CommandId::from_path(Path::new("/")).is_none());
        assert!(CommandId::from_path(&PathBuf::new()).is_none());
    }

    #[test]
    fn test_file_name() {
        let id = CommandId::new("set_replace");
        assert_eq!(id.file_name("txt"), "SET_REPLACE.txt");
        assert_eq!(id.file_name(""), "SET_REPLACE");
    }
}
