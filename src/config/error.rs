//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("no per-user data directory on this platform; set `channel.dir` or MAILSLOT_DIR")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("mailslot.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("mailslot.toml"));

        let validation_err = ConfigError::Validation("reader.attempts must be at least 1".into());
        assert!(format!("{validation_err}").contains("reader.attempts"));

        assert!(format!("{}", ConfigError::NoDataDir).contains("MAILSLOT_DIR"));
    }
}
