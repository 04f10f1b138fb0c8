//! Database migration command.
//!
//! Applies the migrations in `crates/api/migrations/`, which are embedded in
//! the binary at build time.
//!
//! ```bash
//! blueprint-cli migrate
//! ```

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let (_config, pool) = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
