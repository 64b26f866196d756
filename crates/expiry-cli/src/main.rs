//! `expiry`: desktop expiry tracking.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Run the background scanner (tray icon where available) |
//! | `scan` | Scan all tracked databases once |
//! | `db` | Create, track, list, and remove databases |
//! | `products` | List, add, and remove products |
//! | `config` | View or change scan settings |
//! | `edit` | Interactive product editor |
//! | `settings` | Interactive settings editor |
//! | `completions` | Generate shell completions |
//!
//! # Environment Variables
//!
//! - `EXPIRY_SETTINGS`: Settings file (overridden by `--settings`)
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use expiry_core::SettingsStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod desktop;
mod onboarding;
mod style;
mod tray;
mod util;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "expiry", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let settings = match &cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::open_default(),
    };
    tracing::debug!("Using settings at {}", settings.path().display());

    let Cli {
        quiet,
        no_color,
        command,
        settings: settings_override,
        ..
    } = cli;

    match command {
        Commands::Run { no_tray } => {
            commands::cmd_run(settings, settings_override, no_tray, no_color).await
        }
        Commands::Scan { json } => commands::cmd_scan(&settings, json, quiet, no_color),
        Commands::Db { action } => commands::cmd_db(&settings, action, quiet, no_color),
        Commands::Products { action } => commands::cmd_products(&settings, action, quiet, no_color),
        Commands::Config { action } => commands::cmd_config(&settings, action, quiet, no_color),
        Commands::Edit => commands::cmd_edit(&settings, no_color),
        Commands::Settings => commands::cmd_settings(&settings, no_color),
        Commands::Completions { .. } => Ok(()),
    }
}
