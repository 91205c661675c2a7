//! Configuration sections.
//!
//! ```toml
//! [channel]
//! dir = "~/ipc"              # explicit shared directory (optional)
//! vendor = "NathanSilvers"   # default: <data dir>/<vendor>/<app>
//! app = "POORMANS_IPC"
//! extension = "txt"
//!
//! [reader]
//! attempts = 10
//! delay_ms = 20
//!
//! [writer]
//! attempts = 3
//! delay_ms = 30
//! backoff = false
//!
//! [scan]
//! window_secs = 10
//!
//! [tool]
//! program = "Blitz"          # looked up on PATH
//! path = "C:/Program Files/Blitz/Blitz.exe"   # optional
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::channel::{DEFAULT_EXTENSION, RetryPolicy};

/// Environment variable that overrides the shared directory.
pub const DIR_ENV: &str = "MAILSLOT_DIR";

// ============================================================================
// [channel]
// ============================================================================

/// Where the shared directory lives and how messages are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Explicit shared directory. `~` is expanded.
    pub dir: Option<String>,

    /// Vendor folder under the per-user data directory.
    pub vendor: String,

    /// Application folder under the vendor folder.
    pub app: String,

    /// Message file extension (without the dot).
    pub extension: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            dir: None,
            vendor: "NathanSilvers".to_string(),
            app: "POORMANS_IPC".to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl ChannelConfig {
    /// Resolve the shared directory: `MAILSLOT_DIR`, then `dir`, then
    /// `<data dir>/<vendor>/<app>`.
    pub fn resolve_dir(&self) -> Result<PathBuf, ConfigError> {
        self.resolve_dir_with(std::env::var(DIR_ENV).ok(), dirs::data_dir())
    }

    pub(crate) fn resolve_dir_with(
        &self,
        env: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = env.filter(|d| !d.trim().is_empty()) {
            return Ok(expand(&dir));
        }
        if let Some(dir) = &self.dir {
            return Ok(expand(dir));
        }
        let root = data_dir.ok_or(ConfigError::NoDataDir)?;
        Ok(root.join(&self.vendor).join(&self.app))
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "channel.extension `{ext}` must be a bare extension like `txt`"
            )));
        }
        if self.dir.is_none() && (self.vendor.is_empty() || self.app.is_empty()) {
            return Err(ConfigError::Validation(
                "channel.vendor and channel.app must be non-empty".into(),
            ));
        }
        Ok(())
    }
}

fn expand(dir: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(dir).as_ref())
}

// ============================================================================
// [reader] / [writer]
// ============================================================================

/// Retry budget for reading a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub attempts: u32,
    pub delay_ms: u64,
    pub backoff: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            attempts: RetryPolicy::READ.attempts,
            delay_ms: 20,
            backoff: false,
        }
    }
}

/// Retry budget for writing a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub attempts: u32,
    pub delay_ms: u64,
    pub backoff: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            attempts: RetryPolicy::WRITE.attempts,
            delay_ms: 30,
            backoff: false,
        }
    }
}

impl ReaderConfig {
    pub fn policy(&self) -> RetryPolicy {
        retry_policy(self.attempts, self.delay_ms, self.backoff)
    }
}

impl WriterConfig {
    pub fn policy(&self) -> RetryPolicy {
        retry_policy(self.attempts, self.delay_ms, self.backoff)
    }
}

fn retry_policy(attempts: u32, delay_ms: u64, backoff: bool) -> RetryPolicy {
    RetryPolicy::fixed(attempts, Duration::from_millis(delay_ms)).with_backoff(backoff)
}

pub(super) fn validate_attempts(section: &str, attempts: u32) -> Result<(), ConfigError> {
    if attempts == 0 {
        return Err(ConfigError::Validation(format!(
            "{section}.attempts must be at least 1"
        )));
    }
    Ok(())
}

// ============================================================================
// [scan]
// ============================================================================

/// Catch-up scan defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Window (seconds) replayed by `mailslot scan` and `listen --catch-up`.
    pub window_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { window_secs: 10 }
    }
}

impl ScanConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

// ============================================================================
// [tool]
// ============================================================================

/// The companion tool started after sending search context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable name, looked up on `PATH` when `path` is unset or missing.
    pub program: String,

    /// Explicit executable location. `~` is expanded.
    pub path: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "Blitz".to_string(),
            path: None,
        }
    }
}

impl ToolConfig {
    /// Explicit `path`, else `%PROGRAMFILES%/<program>/<program>.exe` when
    /// that variable is set.
    pub fn install_path(&self) -> Option<PathBuf> {
        self.install_path_with(std::env::var_os("PROGRAMFILES").map(PathBuf::from))
    }

    pub(crate) fn install_path_with(&self, program_files: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(expand(path));
        }
        let exe = format!("{}.exe", self.program);
        program_files.map(|root| root.join(&self.program).join(exe))
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tool.program must be non-empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_tool_install_path() {
        let tool = ToolConfig::default();
        assert_eq!(tool.install_path_with(None), None);
        assert_eq!(
            tool.install_path_with(Some(PathBuf::from("/pf"))),
            Some(PathBuf::from("/pf/Blitz/Blitz.exe"))
        );

        let config = test_parse_config("[tool]\nprogram = \"finder\"\npath = \"/opt/finder/bin/finder\"");
        assert_eq!(
            config.tool.install_path_with(Some(PathBuf::from("/pf"))),
            Some(PathBuf::from("/opt/finder/bin/finder"))
        );
    }

    #[test]
    fn test_channel_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.channel.vendor, "NathanSilvers");
        assert_eq!(config.channel.app, "POORMANS_IPC");
        assert_eq!(config.channel.extension, "txt");
        assert!(config.channel.dir.is_none());
    }

    #[test]
    fn test_resolve_dir_precedence() {
        let mut channel = ChannelConfig::default();
        let data = Some(PathBuf::from("/data"));

        assert_eq!(
            channel.resolve_dir_with(None, data.clone()).unwrap(),
            PathBuf::from("/data/NathanSilvers/POORMANS_IPC")
        );

        channel.dir = Some("/explicit".into());
        assert_eq!(
            channel.resolve_dir_with(None, data.clone()).unwrap(),
            PathBuf::from("/explicit")
        );

        assert_eq!(
            channel
                .resolve_dir_with(Some("/from/env".into()), data.clone())
                .unwrap(),
            PathBuf::from("/from/env")
        );

        // Blank env value is ignored
        assert_eq!(
            channel.resolve_dir_with(Some("  ".into()), data).unwrap(),
            PathBuf::from("/explicit")
        );
    }

    #[test]
    fn test_resolve_dir_without_data_dir() {
        let channel = ChannelConfig::default();
        assert!(matches!(
            channel.resolve_dir_with(None, None),
            Err(ConfigError::NoDataDir)
        ));
    }

    #[test]
    fn test_tilde_expansion() {
        if dirs::home_dir().is_none() {
            return;
        }
        let channel = ChannelConfig {
            dir: Some("~/ipc".into()),
            ..ChannelConfig::default()
        };
        let dir = channel.resolve_dir_with(None, None).unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with("ipc"));
    }

    #[test]
    fn test_extension_validation() {
        for bad in ["", ".txt", "a/b"] {
            let channel = ChannelConfig {
                extension: bad.into(),
                ..ChannelConfig::default()
            };
            assert!(channel.validate().is_err(), "accepted `{bad}`");
        }
        assert!(ChannelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_retry_sections() {
        let config = test_parse_config(
            "[reader]\nattempts = 4\ndelay_ms = 5\n[writer]\nattempts = 2\nbackoff = true",
        );

        let reader = config.reader.policy();
        assert_eq!(reader.attempts, 4);
        assert_eq!(reader.delay, Duration::from_millis(5));
        assert!(!reader.backoff);

        let writer = config.writer.policy();
        assert_eq!(writer.attempts, 2);
        assert_eq!(writer.delay, Duration::from_millis(30));
        assert!(writer.backoff);
    }

    #[test]
    fn test_retry_defaults_match_channel() {
        let config = test_parse_config("");
        assert_eq!(config.reader.policy(), RetryPolicy::READ);
        assert_eq!(config.writer.policy(), RetryPolicy::WRITE);
    }

    #[test]
    fn test_scan_window() {
        assert_eq!(test_parse_config("").scan.window(), Duration::from_secs(10));
        let config = test_parse_config("[scan]\nwindow_secs = 120");
        assert_eq!(config.scan.window(), Duration::from_secs(120));
    }
}
