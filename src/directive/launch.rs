//! Starting the companion tool.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use parking_lot::Mutex;

use crate::config::ToolConfig;
use crate::debug;

/// Finds and starts the companion tool.
pub trait ToolLauncher {
    /// Executable location, `None` when the tool is not installed.
    fn locate(&self) -> Option<PathBuf>;

    /// Whether an instance is already up.
    fn is_running(&self) -> bool;

    /// Start `exe` detached.
    fn launch(&self, exe: &Path) -> io::Result<()>;
}

/// Launcher backed by a real process.
///
/// Only instances started through this launcher are known to be running.
/// The tool is single-instance, so starting it again when some other
/// process already did just hands over to the running one.
pub struct ProcessLauncher {
    program: String,
    path: Option<PathBuf>,
    child: Mutex<Option<Child>>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            path,
            child: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.program.clone(), config.install_path())
    }
}

impl ToolLauncher for ProcessLauncher {
    fn locate(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path
            && path.is_file()
        {
            return Some(path.clone());
        }
        which::which(&self.program).ok()
    }

    fn is_running(&self) -> bool {
        let mut child = self.child.lock();
        let alive = matches!(child.as_mut().map(Child::try_wait), Some(Ok(None)));
        if !alive {
            *child = None;
        }
        alive
    }

    fn launch(&self, exe: &Path) -> io::Result<()> {
        let child = Command::new(exe)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!("launch"; "{} started (pid {})", exe.display(), child.id());
        *self.child.lock() = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    #[test]
    fn test_locate_explicit_path() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("finder.exe");
        std::fs::write(&exe, "").unwrap();

        let launcher = ProcessLauncher::new("no-such-tool-9f3a", Some(exe.clone()));
        assert_eq!(launcher.locate(), Some(exe));
    }

    #[test]
    fn test_locate_missing_tool() {
        let dir = TempDir::new().unwrap();
        let launcher =
            ProcessLauncher::new("no-such-tool-9f3a", Some(dir.path().join("absent.exe")));
        assert_eq!(launcher.locate(), None);
        assert!(!launcher.is_running());
    }

    #[test]
    fn test_launch_missing_executable_fails() {
        let dir = TempDir::new().unwrap();
        let launcher = ProcessLauncher::new("no-such-tool-9f3a", None);
        assert!(launcher.launch(&dir.path().join("absent")).is_err());
        assert!(!launcher.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn test_launched_process_tracked_until_exit() {
        let Ok(exe) = which::which("true") else {
            return;
        };
        let launcher = ProcessLauncher::new("true", None);
        launcher.launch(&exe).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while launcher.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(!launcher.is_running());
    }
}
