//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! em-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Admin migrations live in `crates/admin/migrations/` and are embedded into
//! the admin crate at compile time.

use expiration_manager_admin::{
    config::{ConfigError, get_database_url},
    db,
};
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let _ = dotenvy::dotenv();

    let database_url = get_database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running admin migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
