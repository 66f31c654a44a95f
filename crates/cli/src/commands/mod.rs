//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use shoplist_api::db::seed::SeedError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid command-line argument.
    #[error("Invalid {field}: {message}")]
    InvalidArgument { field: &'static str, message: String },

    /// Seeding failed.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Connect to the list database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOPLIST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("SHOPLIST_DATABASE_URL"))?;

    tracing::info!("Connecting to list database...");
    Ok(shoplist_api::db::create_pool(&database_url).await?)
}
