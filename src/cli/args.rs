//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// File-drop IPC channel between an editor and a companion tool
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: mailslot.toml)
    #[arg(short = 'C', long, global = true, default_value = "mailslot.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Shared directory (overrides config and MAILSLOT_DIR)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write one message into the shared directory
    #[command(visible_alias = "s")]
    Send {
        /// Command name (file base name), e.g. SET_SEARCH
        command: String,

        /// Message payload. Omit or use `-` to read stdin
        payload: Option<String>,
    },

    /// Watch the shared directory and print incoming messages until Ctrl+C
    #[command(visible_alias = "l")]
    Listen {
        #[command(flatten)]
        filter: CommandFilter,

        /// Replay messages written within this many seconds before attaching
        /// (default: [scan] window_secs)
        #[arg(long, value_name = "SECS")]
        catch_up: Option<u64>,
    },

    /// Dispatch messages written recently, then exit
    Scan {
        #[command(flatten)]
        filter: CommandFilter,

        /// Window in seconds (default: [scan] window_secs)
        #[arg(short, long, value_name = "SECS")]
        within: Option<u64>,
    },

    /// Ask the editor to open a file at a position
    #[command(visible_alias = "g")]
    Goto {
        #[command(flatten)]
        args: GotoArgs,
    },

    /// Send search text to the companion tool, starting it if needed
    Search {
        /// Word under the caret (sent as a word query)
        word: Option<String>,

        /// Selected text, sent verbatim (wins over WORD)
        #[arg(long)]
        selection: Option<String>,

        /// Fill the replace box instead of the search box
        #[arg(short, long)]
        replace: bool,
    },

    /// Print the shared directory path
    Path,
}

/// Which commands to handle.
#[derive(clap::Args, Debug, Clone)]
pub struct CommandFilter {
    /// Command names to handle (default: every known command)
    #[arg(short, long = "command", value_name = "NAME")]
    pub commands: Vec<String>,
}

/// Goto command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct GotoArgs {
    /// File to open
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Line, 1-based
    #[arg(default_value_t = 1)]
    pub line: u32,

    /// Column, 1-based
    #[arg(default_value_t = 1)]
    pub column: u32,

    /// Solution the file belongs to; only an editor with it open reacts
    #[arg(short, long, required_unless_present = "legacy")]
    pub solution: Option<String>,

    /// Open in a preview tab
    #[arg(short, long)]
    pub preview: bool,

    /// Send the delimited `file;line;column` form instead of JSON
    #[arg(long)]
    pub legacy: bool,
}
