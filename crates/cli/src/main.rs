//! Shoplist CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shoplist-cli migrate
//!
//! # Insert the demo lists for one user
//! shoplist-cli seed --awid demo --owner alex
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPLIST_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "shoplist-cli")]
#[command(author, version, about = "Shoplist CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert the demo shopping lists
    Seed {
        /// Workspace the lists belong to
        #[arg(short, long)]
        awid: String,

        /// Identity that owns "Car care" and joins the other lists
        #[arg(short, long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { awid, owner } => commands::seed::demo_lists(&awid, &owner).await,
    }
}
