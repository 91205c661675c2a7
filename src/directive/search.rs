//! Search text for `SET_SEARCH` / `SET_REPLACE`, and handing it to the
//! companion tool.

use super::goto::Notifier;
use super::launch::ToolLauncher;
use crate::channel::Endpoint;
use crate::debug;

/// Title of search-context notifications.
pub const SEARCH_TITLE: &str = "Search Context";

/// Build the search payload from what the editor has under the caret.
///
/// A non-empty selection is sent verbatim. Otherwise the word under the
/// caret is sent as a word query: `^@word` when it has no upper-case
/// letters (case-sensitive match), `@word` otherwise. Nothing available
/// gives an empty payload.
pub fn search_query(selection: Option<&str>, word_under_caret: Option<&str>) -> String {
    if let Some(text) = selection.filter(|s| !s.is_empty()) {
        return text.to_string();
    }

    match word_under_caret.filter(|w| !w.is_empty()) {
        Some(word) if word.to_lowercase() == word => format!("^@{word}"),
        Some(word) => format!("@{word}"),
        None => String::new(),
    }
}

/// Send the search text under `command` and make sure the tool is up.
///
/// The message is written even when the tool cannot be found, so a tool
/// started later still picks it up on catch-up. A missing install or a
/// failed launch is reported through `notifier`. Returns whether the message
/// was written.
pub fn send_search_context(
    endpoint: &Endpoint,
    command: &str,
    selection: Option<&str>,
    word_under_caret: Option<&str>,
    launcher: &dyn ToolLauncher,
    notifier: &dyn Notifier,
) -> bool {
    let text = search_query(selection, word_under_caret);
    let exe = launcher.locate();
    if exe.is_none() {
        notifier.notify(
            SEARCH_TITLE,
            "Failed to locate the search tool; install it or set [tool] path",
        );
    }

    let sent = endpoint.send(command, &text);

    if let Some(exe) = exe {
        if launcher.is_running() {
            debug!("launch"; "{} already running", exe.display());
        } else if let Err(e) = launcher.launch(&exe) {
            notifier.notify(
                SEARCH_TITLE,
                &format!("Failed to start {}: {}", exe.display(), e),
            );
        }
    }

    sent
}
