//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use rest_blueprint_api::config::{AppConfig, ConfigError};
use rest_blueprint_api::db::{self, RepositoryError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A repository call failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Load configuration and open a pool against the configured database.
async fn connect() -> Result<(AppConfig, PgPool), CommandError> {
    let config = AppConfig::load()?;
    if let Some(path) = &config.missing_file {
        tracing::warn!(path = %path, "Config file not found, using environment and defaults");
    }

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.db).await?;

    Ok((config, pool))
}
