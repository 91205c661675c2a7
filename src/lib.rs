//! mailslot: file-drop IPC between an editor plugin and a companion tool.
//!
//! Each message is a file named after its command in one shared directory.
//! Writing the file sends the message; a directory watcher on the other end
//! reads it and calls the handler registered for that command.
//!
//! ```no_run
//! use mailslot::{Endpoint, MailslotConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = MailslotConfig::default();
//! let endpoint = Endpoint::from_config(&config)?;
//! endpoint.register_action("SET_SEARCH", |text| {
//!     println!("search for {text}");
//!     Ok(())
//! });
//!
//! // Attach first, then pick up what arrived while nobody was listening
//! let listener = endpoint.listen()?;
//! endpoint.execute_within(std::time::SystemTime::now(), config.scan.window());
//! # drop(listener);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod directive;
pub mod logger;
pub mod watch;

pub use channel::{ChannelOptions, CommandId, DispatchOutcome, Endpoint, RetryPolicy};
pub use config::{ConfigError, MailslotConfig};
pub use directive::{DirectiveError, Editor, GotoDirective, GotoRouter};
pub use watch::{Listener, WatchError};
