//! Directives carried over the channel.
//!
//! The channel itself treats payloads as opaque text. This module holds the
//! payload formats both ends agree on:
//!
//! - [`goto`]: "open file at line/column", delimited or JSON
//! - [`search`]: search/replace text taken from an editor selection, sent
//!   to the companion tool, which [`launch`] starts if needed
//! - [`export`]: solution/project/open-file snapshots sent to the tool

pub mod export;
pub mod goto;
pub mod launch;
pub mod search;

use thiserror::Error;

pub use export::{ActiveFilesList, ProjectExport, SelectedProjectExport, SolutionExport};
pub use goto::{Editor, GotoDirective, GotoRouter, GotoTarget, Notifier, Position};
pub use launch::{ProcessLauncher, ToolLauncher};
pub use search::{SEARCH_TITLE, search_query, send_search_context};

/// Command names used by the editor plugin and the search tool.
pub mod commands {
    /// Tool side: set the search box text.
    pub const SET_SEARCH: &str = "SET_SEARCH";
    /// Tool side: set the replace box text.
    pub const SET_REPLACE: &str = "SET_REPLACE";

    /// Editor side: open a file, `file;line;column`.
    pub const GOTO: &str = "VISUAL_STUDIO_GOTO";
    /// Editor side: open in a preview tab, `file;line;column`.
    pub const GOTO_PREVIEW: &str = "VISUAL_STUDIO_GOTO_PREVIEW";
    /// Editor side: open a file, JSON [`GotoDirective`](super::GotoDirective).
    pub const GOTO_JSON: &str = "VISUAL_STUDIO_GOTO_JSON";
    /// Editor side: open in a preview tab, JSON directive.
    pub const GOTO_PREVIEW_JSON: &str = "VISUAL_STUDIO_GOTO_PREVIEW_JSON";

    /// Tool side: whole-solution file listing.
    pub const VS_SOLUTION: &str = "VS_SOLUTION";
    /// Tool side: project owning the selected item.
    pub const VS_PROJECT: &str = "VS_PROJECT";
    /// Tool side: files open in editor windows.
    pub const VS_ACTIVE_FILES: &str = "VS_ACTIVE_FILES";

    /// Every command the editor side listens for.
    pub const EDITOR_COMMANDS: [&str; 4] = [GOTO, GOTO_PREVIEW, GOTO_JSON, GOTO_PREVIEW_JSON];

    /// Every command the tool side listens for.
    pub const TOOL_COMMANDS: [&str; 5] =
        [SET_SEARCH, SET_REPLACE, VS_SOLUTION, VS_PROJECT, VS_ACTIVE_FILES];
}

/// Payload decoding failures.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("expected `file;line;column`, got {0} field(s)")]
    Malformed(usize),

    #[error("invalid goto directive")]
    Json(#[from] serde_json::Error),
}
