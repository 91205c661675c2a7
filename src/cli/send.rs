//! `send`, `goto` and `search`: write one message.

use std::io::{self, Read};
use std::path::{self, Path};

use anyhow::{Context, Result};
use mailslot::config::ToolConfig;
use mailslot::directive::commands::{
    GOTO, GOTO_JSON, GOTO_PREVIEW, GOTO_PREVIEW_JSON, SET_REPLACE, SET_SEARCH,
};
use mailslot::directive::{
    GotoTarget, Notifier, Position, ProcessLauncher, ToolLauncher, send_search_context,
};
use mailslot::{CommandId, Endpoint, log};

use super::GotoArgs;

/// Send `payload` (stdin when absent or `-`) under `command`.
pub fn run_send(endpoint: &Endpoint, command: &str, payload: Option<&str>) -> Result<()> {
    let payload = match payload {
        Some(text) if text != "-" => text.to_string(),
        _ => read_stdin()?,
    };
    deliver(endpoint, CommandId::new(command), &payload)
}

/// Send a goto directive for the editor.
pub fn run_goto(endpoint: &Endpoint, args: &GotoArgs) -> Result<()> {
    let target = GotoTarget {
        file: absolute(&args.file),
        position: Position {
            line: args.line.max(1),
            column: args.column.max(1),
        },
    };

    let (command, payload) = match (&args.solution, args.legacy) {
        (Some(solution), false) => {
            let command = if args.preview { GOTO_PREVIEW_JSON } else { GOTO_JSON };
            (command, target.to_directive(solution).to_json())
        }
        _ => {
            let command = if args.preview { GOTO_PREVIEW } else { GOTO };
            (command, target.to_delimited())
        }
    };

    deliver(endpoint, CommandId::new(command), &payload)
}

/// Send search context and start the tool if it is not running.
pub fn run_search(
    endpoint: &Endpoint,
    tool: &ToolConfig,
    word: Option<&str>,
    selection: Option<&str>,
    replace: bool,
) -> Result<()> {
    let launcher = ProcessLauncher::from_config(tool);
    search_with(endpoint, &launcher, word, selection, replace)
}

fn search_with(
    endpoint: &Endpoint,
    launcher: &dyn ToolLauncher,
    word: Option<&str>,
    selection: Option<&str>,
    replace: bool,
) -> Result<()> {
    let command = if replace { SET_REPLACE } else { SET_SEARCH };
    if !send_search_context(endpoint, command, selection, word, launcher, &Console) {
        anyhow::bail!("could not write {}", endpoint.message_path(command).display());
    }
    log!("send"; "{} → {}", command, endpoint.message_path(command).display());
    Ok(())
}

/// Notifications go to the terminal.
struct Console;

impl Notifier for Console {
    fn notify(&self, title: &str, message: &str) {
        log!("error"; "{}: {}", title, message);
    }
}

fn deliver(endpoint: &Endpoint, command: CommandId, payload: &str) -> Result<()> {
    let path = endpoint.message_path(command.clone());
    if !endpoint.send(command.clone(), payload) {
        anyhow::bail!("could not write {}", path.display());
    }
    log!("send"; "{} ({} bytes) → {}", command, payload.len(), path.display());
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read payload from stdin")?;
    Ok(buf)
}

/// The editor resolves paths against its own working directory.
fn absolute(file: &Path) -> std::path::PathBuf {
    path::absolute(file).unwrap_or_else(|_| file.to_path_buf())
}
