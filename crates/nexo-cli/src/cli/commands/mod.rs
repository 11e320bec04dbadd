//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod backfill;
mod config_cmd;
mod helpers;
mod pending;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nexo::config::{load_settings_with_options, LoadOptions};
use nexo::models::DocumentKind;

#[derive(Parser)]
#[command(name = "nexo")]
#[command(about = "Archive NEXO AV invoices and quotes as PDFs")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Render and archive every invoice and quote missing a stored PDF
    Backfill {
        /// Print the run report as JSON instead of live progress
        #[arg(long)]
        json: bool,
    },

    /// List documents still waiting to be archived
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a single document to a local PDF file (nothing is uploaded)
    Render {
        /// Document kind: invoice or quote
        kind: DocumentKind,
        /// Document ID
        id: String,
        /// Output file (default: <kind>-<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective settings (secrets redacted)
    Show,
    /// Show which config file was loaded
    Path,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, config) = load_settings_with_options(options)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Backfill { json } => backfill::cmd_backfill(&settings, json).await,
        Commands::Pending { json } => pending::cmd_pending(&settings, json).await,
        Commands::Render { kind, id, output } => {
            render::cmd_render(&settings, kind, &id, output).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config),
            ConfigCommands::Path => config_cmd::cmd_config_path(&config),
        },
    }
}
