//! Configuration for `mailslot.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # [channel] [reader] [writer] [scan] [tool]
//! ├── error      # ConfigError
//! ├── util       # config file discovery
//! └── mod.rs     # MailslotConfig (this file)
//! ```
//!
//! The file is optional: without one every section takes its defaults and
//! the shared directory is `<data dir>/NathanSilvers/POORMANS_IPC`, which is
//! what the editor plugin on the other end of the channel expects.

mod error;
mod section;
mod util;

pub use error::ConfigError;
pub use section::{ChannelConfig, DIR_ENV, ReaderConfig, ScanConfig, ToolConfig, WriterConfig};
pub use util::find_config_file;

use crate::channel::ChannelOptions;
use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the current directory.
pub const CONFIG_FILE: &str = "mailslot.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing mailslot.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailslotConfig {
    /// Absolute path of the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Shared directory location and message naming
    pub channel: ChannelConfig,

    /// Message reader retry budget
    pub reader: ReaderConfig,

    /// Message writer retry budget
    pub writer: WriterConfig,

    /// Catch-up scan defaults
    pub scan: ScanConfig,

    /// Companion tool launched by `mailslot search`
    pub tool: ToolConfig,
}

impl MailslotConfig {
    /// Load `name` by searching upward from the current directory.
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load(name: &Path) -> Result<Self, ConfigError> {
        match find_config_file(name) {
            Some(path) => Self::from_path(&path),
            None => {
                crate::debug!("config"; "{} not found, using defaults", name.display());
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a file, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel.validate()?;
        section::validate_attempts("reader", self.reader.attempts)?;
        section::validate_attempts("writer", self.writer.attempts)?;
        self.tool.validate()?;
        Ok(())
    }

    /// Channel tunables derived from the `[channel]`, `[reader]` and
    /// `[writer]` sections.
    pub fn channel_options(&self) -> ChannelOptions {
        ChannelOptions {
            extension: self.channel.extension.clone(),
            reader: self.reader.policy(),
            writer: self.writer.policy(),
        }
    }
}

/// Parse a config snippet in tests, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> MailslotConfig {
    let (parsed, ignored) = MailslotConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::RetryPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        let config = MailslotConfig::from_str("").unwrap();
        assert_eq!(config.channel.extension, "txt");
        assert_eq!(config.reader.attempts, 10);
        assert_eq!(config.writer.attempts, 3);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_channel_options() {
        let config = MailslotConfig::from_str(
            "[channel]\nextension = \"msg\"\n[reader]\nattempts = 2\ndelay_ms = 1",
        )
        .unwrap();
        let options = config.channel_options();
        assert_eq!(options.extension, "msg");
        assert_eq!(
            options.reader,
            RetryPolicy::fixed(2, std::time::Duration::from_millis(1))
        );
        assert_eq!(options.writer, RetryPolicy::WRITE);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = MailslotConfig::from_str("[writer]\nattempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_blank_tool_program_rejected() {
        let err = MailslotConfig::from_str("[tool]\nprogram = \" \"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = MailslotConfig::from_str("[reader\nattempts = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            MailslotConfig::parse_with_ignored("[reader]\nattempts = 4\nretries = 9\n[extra]\nx = 1")
                .unwrap();
        assert_eq!(config.reader.attempts, 4);
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "reader.retries"));
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[channel]\ndir = \"/tmp/ipc\"\n[scan]\nwindow_secs = 3").unwrap();

        let config = MailslotConfig::from_path(&path).unwrap();
        assert_eq!(config.channel.dir.as_deref(), Some("/tmp/ipc"));
        assert_eq!(config.scan.window_secs, 3);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_from_path_missing() {
        let dir = TempDir::new().unwrap();
        let err = MailslotConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
