//! Goto directives: "open this file at this line and column".
//!
//! Two wire forms exist:
//!
//! - Delimited text `file;line;column`. A `,` separator is still accepted
//!   when the payload has no `;`, for older senders. New senders should use
//!   `;` or, better, the JSON form.
//! - JSON [`GotoDirective`], which also names the originating solution so
//!   that only the editor instance with that solution open reacts.
//!
//! Lines are 1-based on the wire, columns 0-based. [`Position`] is 1-based
//! in both.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DirectiveError;
use super::commands::{GOTO, GOTO_JSON, GOTO_PREVIEW, GOTO_PREVIEW_JSON};
use crate::channel::Endpoint;
use crate::debug;

/// Preferred delimiter.
const SEPARATOR: char = ';';
/// Older senders used `,`, which is legal inside file names.
const LEGACY_SEPARATOR: char = ',';

/// Structured goto payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GotoDirective {
    /// Full path of the solution the sender is working in.
    pub solution_name: String,
    pub file_name: String,
    /// 1-based.
    pub line: u32,
    /// 0-based.
    pub column: u32,
}

impl GotoDirective {
    pub fn parse(payload: &str) -> Result<Self, DirectiveError> {
        Ok(serde_json::from_str(payload.trim_start_matches('\u{FEFF}'))?)
    }

    pub fn to_json(&self) -> String {
        // Plain strings and integers cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn target(&self) -> GotoTarget {
        GotoTarget {
            file: PathBuf::from(&self.file_name),
            position: Position::from_wire(self.line, self.column),
        }
    }
}

/// Caret position, 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Convert wire coordinates (1-based line, 0-based column).
    pub fn from_wire(line: u32, column: u32) -> Self {
        Self {
            line: line.max(1),
            column: column.saturating_add(1),
        }
    }
}

/// Decoded goto: which file, where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoTarget {
    pub file: PathBuf,
    pub position: Position,
}

impl GotoTarget {
    /// Parse `file;line;column` (or legacy `file,line,column`).
    ///
    /// The file part may itself contain the separator: the last two fields
    /// are line and column. Unparsable numbers fall back to line 1 and
    /// column 0.
    pub fn parse_delimited(payload: &str) -> Result<Self, DirectiveError> {
        let payload = payload.trim_end_matches(['\r', '\n']);
        let separator = if payload.contains(SEPARATOR) {
            SEPARATOR
        } else {
            LEGACY_SEPARATOR
        };

        let mut fields = payload.rsplitn(3, separator);
        let (Some(column), Some(line), Some(file)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(DirectiveError::Malformed(payload.split(separator).count()));
        };
        if file.is_empty() {
            return Err(DirectiveError::Malformed(3));
        }

        let line = line.trim().parse().unwrap_or(1);
        let column = column.trim().parse().unwrap_or(0);

        Ok(Self {
            file: PathBuf::from(file),
            position: Position::from_wire(line, column),
        })
    }

    /// JSON directive addressed to the editor that has `solution` open.
    pub fn to_directive(&self, solution: impl Into<String>) -> GotoDirective {
        GotoDirective {
            solution_name: solution.into(),
            file_name: self.file.to_string_lossy().into_owned(),
            line: self.position.line,
            column: self.position.column.saturating_sub(1),
        }
    }

    /// Encode as `file;line;column` with a 0-based column.
    pub fn to_delimited(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.file.display(),
            self.position.line,
            self.position.column.saturating_sub(1)
        )
    }
}

// ============================================================================
// Editor side
// ============================================================================

/// One-shot user notification (message box).
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// The host editor, as far as goto handling needs it.
///
/// Implementations are called on the listener thread and must hand off to
/// their UI thread themselves if the host requires it.
pub trait Editor: Notifier + Send + Sync {
    /// Full path of the open solution, if any.
    fn current_solution(&self) -> Option<String>;

    /// Open `file`, in a preview tab if `preview`.
    fn open(&self, file: &Path, preview: bool) -> anyhow::Result<()>;

    /// Move the caret of the active document.
    fn move_caret(&self, position: Position) -> anyhow::Result<()>;
}

/// Registers the four goto commands against an [`Editor`].
pub struct GotoRouter<E: ?Sized> {
    editor: Arc<E>,
}

impl<E: Editor + ?Sized + 'static> GotoRouter<E> {
    pub fn new(editor: Arc<E>) -> Self {
        Self { editor }
    }

    /// Register `VISUAL_STUDIO_GOTO[_PREVIEW][_JSON]` on `endpoint`.
    pub fn install(endpoint: &Endpoint, editor: Arc<E>) {
        for (command, preview, json) in [
            (GOTO, false, false),
            (GOTO_PREVIEW, true, false),
            (GOTO_JSON, false, true),
            (GOTO_PREVIEW_JSON, true, true),
        ] {
            let router = Self::new(Arc::clone(&editor));
            endpoint.register_action(command, move |payload| {
                if json {
                    router.goto_json(payload, preview)
                } else {
                    router.goto_delimited(payload, preview)
                }
            });
        }
    }

    /// Handle a delimited directive. Unparsable input is reported to the
    /// user; a file that does not exist is ignored.
    pub fn goto_delimited(&self, payload: &str, preview: bool) -> anyhow::Result<()> {
        let target = match GotoTarget::parse_delimited(payload) {
            Ok(target) => target,
            Err(e) => {
                self.editor.notify(
                    "Goto Failure",
                    &format!("Failed to parse command from {GOTO}, must be 'file;line;column' ({e})"),
                );
                return Ok(());
            }
        };

        if !target.file.is_file() {
            debug!("goto"; "no such file: {}", target.file.display());
            return Ok(());
        }

        self.navigate(&target, preview)
    }

    /// Handle a JSON directive. Directives for another solution are
    /// ignored; malformed JSON is returned as an error for the dispatcher
    /// to log.
    pub fn goto_json(&self, payload: &str, preview: bool) -> anyhow::Result<()> {
        let directive = GotoDirective::parse(payload)?;

        let current = self.editor.current_solution();
        if current.as_deref() != Some(directive.solution_name.as_str()) {
            debug!("goto"; "directive for {} ignored", directive.solution_name);
            return Ok(());
        }

        self.navigate(&directive.target(), preview)
    }

    fn navigate(&self, target: &GotoTarget, preview: bool) -> anyhow::Result<()> {
        self.editor.open(&target.file, preview)?;
        self.editor.move_caret(target.position)
    }
}
