//! Pufff CLI - Database migrations and locker feed import.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pufff-cli migrate
//!
//! # Import a locker feed export into the directory table
//! pufff-cli lockers import --file lockers.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `lockers import` - Bulk-import a locker feed file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pufff-cli")]
#[command(author, version, about = "Pufff CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the locker directory
    Lockers {
        #[command(subcommand)]
        action: LockersAction,
    },
}

#[derive(Subcommand)]
enum LockersAction {
    /// Import a locker feed file into the directory table
    Import {
        /// Path to the JSON feed export
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Lockers { action } => match action {
            LockersAction::Import { file } => {
                commands::lockers::import(&file).await?;
            }
        },
    }
    Ok(())
}
