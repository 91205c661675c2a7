//! File-drop message channel.
//!
//! A message is a file `<COMMAND>.<ext>` in one shared directory; its base
//! name is the command and its content is an opaque text payload.
//!
//! ```text
//! send() → writer → shared dir → watcher → dispatch() → reader → handler
//!                                 scan  ↗
//! ```
//!
//! The [`Endpoint`] owns the directory, the action registry and the retry
//! policies. It is created once at the composition root and cloned into
//! whatever needs to register, send or dispatch.
//!
//! Delivery is best effort: unregistered commands are ignored, unreadable
//! messages are dropped, handler errors and panics are logged. Nothing here
//! returns an error to the caller.

mod command;
mod reader;
mod registry;
mod retry;
mod scan;
mod writer;


use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::config::{ConfigError, MailslotConfig};
use crate::{debug, log};

pub use command::CommandId;
pub use reader::{decode_payload, read_message};
pub use registry::{ActionRegistry, Handler};
pub use retry::RetryPolicy;
pub use scan::{get_mtime, is_within, recent_messages};
pub use writer::write_message;

/// Default message file extension.
pub const DEFAULT_EXTENSION: &str = "txt";

/// What happened to a dispatched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No handler for the file's command (not an error).
    Unregistered,
    /// A handler exists but the file could not be read within the budget.
    NoContent,
    /// The handler ran and returned `Ok`.
    Handled,
    /// The handler returned an error or panicked.
    Failed,
}

/// Tunables of one channel end.
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    pub extension: String,
    pub reader: RetryPolicy,
    pub writer: RetryPolicy,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            reader: RetryPolicy::READ,
            writer: RetryPolicy::WRITE,
        }
    }
}

/// One end of the channel.
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    options: ChannelOptions,
    registry: ActionRegistry,
}

impl Endpoint {
    /// Endpoint on `dir` with default options. Does not touch the filesystem;
    /// the directory is created lazily by `send` and `listen`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_options(dir, ChannelOptions::default())
    }

    pub fn with_options(dir: impl Into<PathBuf>, options: ChannelOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                dir: dir.into(),
                options,
                registry: ActionRegistry::new(),
            }),
        }
    }

    /// Endpoint on the configured shared directory. Does not touch the
    /// filesystem; see [`Endpoint::open`].
    pub fn from_config(config: &MailslotConfig) -> Result<Self, ConfigError> {
        let dir = config.channel.resolve_dir()?;
        Ok(Self::with_options(dir, config.channel_options()))
    }

    /// Endpoint on the configured shared directory, created if absent.
    pub fn open(config: &MailslotConfig) -> Result<Self, ConfigError> {
        let endpoint = Self::from_config(config)?;
        endpoint
            .ensure_dir()
            .map_err(|e| ConfigError::Io(endpoint.dir().to_path_buf(), e))?;
        Ok(endpoint)
    }

    /// Create the shared directory (and parents) if it does not exist.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir())
    }

    /// The shared directory.
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn options(&self) -> &ChannelOptions {
        &self.inner.options
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.inner.registry
    }

    /// Path a message for `command` is written to.
    pub fn message_path(&self, command: impl Into<CommandId>) -> PathBuf {
        self.dir()
            .join(command.into().file_name(&self.inner.options.extension))
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Register (or replace) the handler for `name`.
    pub fn register_action<F>(&self, name: impl Into<CommandId>, handler: F)
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = name.into();
        if self.inner.registry.register(id.clone(), Arc::new(handler)) {
            debug!("dispatch"; "replaced handler for {}", id);
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Route one message file to its handler.
    ///
    /// Never fails: every problem is folded into the returned outcome and
    /// logged, so a bad message cannot stop the caller's loop.
    pub fn dispatch(&self, path: &Path) -> DispatchOutcome {
        let Some(id) = CommandId::from_path(path) else {
            return DispatchOutcome::Unregistered;
        };

        let Some(handler) = self.inner.registry.get(&id) else {
            debug!("dispatch"; "ignoring {}", path.display());
            return DispatchOutcome::Unregistered;
        };

        let Some(payload) = read_message(path, &self.inner.options.reader) else {
            debug!("dispatch"; "{}: no content", id);
            return DispatchOutcome::NoContent;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler(payload.as_str()))) {
            Ok(Ok(())) => {
                debug!("dispatch"; "{} handled ({} bytes)", id, payload.len());
                DispatchOutcome::Handled
            }
            Ok(Err(e)) => {
                log!("dispatch"; "{} failed: {:#}", id, e);
                DispatchOutcome::Failed
            }
            Err(panic) => {
                log!("dispatch"; "{} panicked: {}", id, panic_message(panic.as_ref()));
                DispatchOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Send
    // =========================================================================

    /// Write `payload` under `command`. Returns whether the write landed.
    pub fn send(&self, command: impl Into<CommandId>, payload: &str) -> bool {
        write_message(
            self.dir(),
            &command.into(),
            &self.inner.options.extension,
            payload,
            &self.inner.options.writer,
        )
        .is_some()
    }

    /// Serialize `value` as JSON and send it under `command`.
    pub fn send_json<T: Serialize + ?Sized>(
        &self,
        command: impl Into<CommandId>,
        value: &T,
    ) -> bool {
        let command = command.into();
        match serde_json::to_string(value) {
            Ok(text) => self.send(command, &text),
            Err(e) => {
                log!("send"; "cannot encode {}: {}", command, e);
                false
            }
        }
    }

    // =========================================================================
    // Catch-up
    // =========================================================================

    /// Replay every message last written within `window` before `now`.
    ///
    /// Returns how many files were dispatched (handled or not).
    pub fn execute_within(&self, now: SystemTime, window: Duration) -> usize {
        let paths = recent_messages(self.dir(), now, window);
        for path in &paths {
            self.dispatch(path);
        }
        debug!("scan"; "replayed {} file(s) from the last {:?}", paths.len(), window);
        paths.len()
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("dir", &self.inner.dir)
            .field("options", &self.inner.options)
            .field("registry", &self.inner.registry)
            .finish()
    }
}

/// Best-effort text of a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
