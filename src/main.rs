//! mailslot - file-drop IPC between an editor plugin and a companion tool.

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use mailslot::{Endpoint, MailslotConfig, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = MailslotConfig::load(&cli.config)?;
    let endpoint = open_endpoint(&cli, &config)?;

    match &cli.command {
        Commands::Send { command, payload } => {
            cli::send::run_send(&endpoint, command, payload.as_deref())
        }
        Commands::Goto { args } => cli::send::run_goto(&endpoint, args),
        Commands::Listen { filter, catch_up } => {
            let window = catch_up.map_or_else(|| config.scan.window(), Duration::from_secs);
            cli::listen::run_listen(&endpoint, filter, window)
        }
        Commands::Scan { filter, within } => {
            let window = within.map_or_else(|| config.scan.window(), Duration::from_secs);
            cli::listen::run_scan(&endpoint, filter, window).map(|_| ())
        }
        Commands::Search {
            word,
            selection,
            replace,
        } => cli::send::run_search(
            &endpoint,
            &config.tool,
            word.as_deref(),
            selection.as_deref(),
            *replace,
        ),
        Commands::Path => {
            println!("{}", endpoint.dir().display());
            Ok(())
        }
    }
}

/// `--dir` wins over the config file and `MAILSLOT_DIR`. The directory is
/// created if absent.
fn open_endpoint(cli: &Cli, config: &MailslotConfig) -> Result<Endpoint> {
    match &cli.dir {
        Some(dir) => {
            let endpoint = Endpoint::with_options(dir, config.channel_options());
            endpoint
                .ensure_dir()
                .with_context(|| format!("cannot create {}", dir.display()))?;
            Ok(endpoint)
        }
        None => Ok(Endpoint::open(config)?),
    }
}
