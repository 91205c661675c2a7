//! `listen` and `scan`: print incoming messages.

use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use crossbeam::channel::{RecvTimeoutError, bounded};
use mailslot::directive::commands::{EDITOR_COMMANDS, GOTO_JSON, GOTO_PREVIEW_JSON, TOOL_COMMANDS};
use mailslot::directive::{GotoDirective, GotoTarget};
use mailslot::{CommandId, Endpoint, log, logger};

use super::CommandFilter;

/// How often the wait loop checks whether the listener died on its own.
const POLL: Duration = Duration::from_millis(500);

/// Attach, replay the last `catch_up`, then print messages until Ctrl+C.
pub fn run_listen(endpoint: &Endpoint, filter: &CommandFilter, catch_up: Duration) -> Result<()> {
    register(endpoint, filter, |id, payload| match describe(id, payload) {
        Ok(text) => logger::status_success(&format!("{id}: {text}")),
        Err(detail) => logger::status_error(&format!("{id}: unreadable directive"), &detail),
    });

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    let listener = endpoint
        .listen()
        .with_context(|| format!("cannot watch {}", endpoint.dir().display()))?;
    log!("listen"; "{} ({})", endpoint.dir().display(), commands_label(endpoint));

    if !catch_up.is_zero() {
        endpoint.execute_within(SystemTime::now(), catch_up);
    }

    loop {
        match stop_rx.recv_timeout(POLL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) if listener.is_finished() => {
                anyhow::bail!("listener stopped: {} is gone", endpoint.dir().display())
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    log!("listen"; "shutting down...");
    listener.shutdown();
    Ok(())
}

/// Dispatch everything written within `within`. Returns how many messages
/// were found.
pub fn run_scan(endpoint: &Endpoint, filter: &CommandFilter, within: Duration) -> Result<usize> {
    register(endpoint, filter, |id, payload| match describe(id, payload) {
        Ok(text) => log!("scan"; "{}: {}", id, text),
        Err(detail) => log!("error"; "{}: unreadable directive ({})", id, detail),
    });

    let count = endpoint.execute_within(SystemTime::now(), within);
    log!("scan"; "{} message(s) in the last {}s", count, within.as_secs());
    Ok(count)
}

/// Register `print` for every filtered command (all known ones by default).
fn register<F>(endpoint: &Endpoint, filter: &CommandFilter, print: F)
where
    F: Fn(&CommandId, &str) + Clone + Send + Sync + 'static,
{
    let names: Vec<&str> = if filter.commands.is_empty() {
        TOOL_COMMANDS.iter().chain(EDITOR_COMMANDS.iter()).copied().collect()
    } else {
        filter.commands.iter().map(String::as_str).collect()
    };

    for name in names {
        let id = CommandId::new(name);
        let print = print.clone();
        endpoint.register_action(id.clone(), move |payload| {
            print(&id, payload);
            Ok(())
        });
    }
}

/// Render a payload for display. JSON goto directives are decoded.
fn describe(id: &CommandId, payload: &str) -> Result<String, String> {
    let is_json_goto = id.as_str() == GOTO_JSON || id.as_str() == GOTO_PREVIEW_JSON;
    if is_json_goto {
        let directive = GotoDirective::parse(payload).map_err(|e| e.to_string())?;
        return Ok(format!(
            "{} [{}]",
            location(&directive.target()),
            directive.solution_name
        ));
    }

    if payload.contains('\n') {
        Ok(format!("\n{}", payload.trim_end()))
    } else {
        Ok(payload.to_string())
    }
}

fn location(target: &GotoTarget) -> String {
    format!(
        "{}:{}:{}",
        target.file.display(),
        target.position.line,
        target.position.column
    )
}

fn commands_label(endpoint: &Endpoint) -> String {
    endpoint
        .registry()
        .commands()
        .iter()
        .map(CommandId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
