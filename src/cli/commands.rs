//! CLI commands implementation.

mod cooldown;
mod extract;
mod fetch;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use profacquire::clients::AcquisitionStrategy;
use profacquire::config::Settings;

#[derive(Parser)]
#[command(name = "profacq")]
#[command(about = "Professional profile acquisition and extraction")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./profacquire.toml, then the user config dir)
    #[arg(long, global = true)]
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
    /// Acquire one profile and print the normalized record as JSON
    Fetch {
        /// Profile identifier (canonical profile URL)
        identifier: String,
        /// Acquisition strategy (api, browser); overrides config
        #[arg(short, long)]
        strategy: Option<AcquisitionStrategy>,
        /// Return the canned test record without any network or browser I/O
        #[arg(long)]
        mock: bool,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Run field extraction over a saved profile page
    Extract {
        /// Saved HTML of a rendered profile page
        html_file: PathBuf,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Show the cooldown state for the configured browser credential
    Cooldown,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())
        .await
        .context("Failed to load settings")?;
    tracing::debug!("Settings: {:?}", settings);

    match cli.command {
        Commands::Fetch {
            identifier,
            strategy,
            mock,
            compact,
        } => fetch::cmd_fetch(&settings, &identifier, strategy, mock, compact).await,
        Commands::Extract { html_file, compact } => {
            extract::cmd_extract(&html_file, compact).await
        }
        Commands::Cooldown => cooldown::cmd_cooldown(&settings).await,
    }
}
