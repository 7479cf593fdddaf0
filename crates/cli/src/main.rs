//! Makhana CLI - Datastore maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Write the sample catalog to a fresh datastore
//! mk-cli seed
//!
//! # Replace an existing datastore with the sample catalog
//! mk-cli seed --force
//!
//! # Hash an admin password for ADMIN_PASSWORD_HASH (reads stdin)
//! echo 'correct horse battery staple' | mk-cli hash-password
//!
//! # Print record counts
//! mk-cli stats
//!
//! # Delete expired shopper sessions
//! mk-cli sessions purge
//! ```
//!
//! Every command works on the datastore in `--data-dir`, which defaults to
//! `STOREFRONT_DATA_DIR` and then `./data`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mk-cli")]
#[command(author, version, about = "Makhana datastore tools")]
struct Cli {
    /// Directory holding database.json and the images folder
    #[arg(long, global = true, env = "STOREFRONT_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample catalog to the datastore
    Seed {
        /// Overwrite an existing datastore
        #[arg(short, long)]
        force: bool,
    },
    /// Hash a password read from stdin for use as ADMIN_PASSWORD_HASH
    HashPassword,
    /// Print record counts for the datastore
    Stats,
    /// Manage shopper sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete sessions past their expiry
    Purge,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

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
        Commands::Seed { force } => commands::seed::run(&cli.data_dir, force).await?,
        Commands::HashPassword => commands::password::hash_from_stdin()?,
        Commands::Stats => commands::stats::run(&cli.data_dir).await?,
        Commands::Sessions { action } => match action {
            SessionAction::Purge => commands::sessions::purge(&cli.data_dir).await?,
        },
    }
    Ok(())
}
