//! Database operations for admin `PostgreSQL`.
//!
//! ## Tables
//!
//! - `logs` - Append-only audit trail, partitioned by shop
//! - `settings` - One row per shop (warning period)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p expiration-manager-cli -- migrate
//! ```
//!
//! Route handlers and services only see the [`AuditLogStore`] and
//! [`SettingsStore`] traits. The `Pg*` repositories back them in production;
//! [`memory`] provides in-process versions for tests.

pub mod audit_log;
pub mod memory;
pub mod settings;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use expiration_manager_core::{LogId, ShopDomain};

use crate::models::{AuditLog, NewAuditLog, Settings};

pub use audit_log::PgAuditLogRepository;
pub use memory::{MemoryAuditLogStore, MemorySettingsStore};
pub use settings::PgSettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Append-only audit trail, scoped by shop.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Append a record. The store assigns `id` and `occurred_at`.
    async fn append(&self, shop: &ShopDomain, entry: NewAuditLog)
    -> Result<AuditLog, RepositoryError>;

    /// Up to `take` records with `id > cursor`, ascending by id.
    async fn list(
        &self,
        shop: &ShopDomain,
        take: i64,
        cursor: Option<LogId>,
    ) -> Result<Vec<AuditLog>, RepositoryError>;

    /// The `take` most recent records, descending by id.
    async fn recent(&self, shop: &ShopDomain, take: i64) -> Result<Vec<AuditLog>, RepositoryError>;

    /// A single record belonging to `shop`.
    async fn get(&self, id: LogId, shop: &ShopDomain) -> Result<Option<AuditLog>, RepositoryError>;

    /// Delete a record belonging to `shop`. Returns whether a row was removed.
    async fn delete(&self, id: LogId, shop: &ShopDomain) -> Result<bool, RepositoryError>;
}

/// Per-shop settings storage.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for `shop`, or `None` if nothing has been saved.
    async fn get(&self, shop: &ShopDomain) -> Result<Option<Settings>, RepositoryError>;

    /// Insert or update the warning period in one atomic step.
    ///
    /// Returns the stored row and `true` if it was newly inserted.
    async fn save(
        &self,
        shop: &ShopDomain,
        warning_period: i32,
    ) -> Result<(Settings, bool), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the admin migrations against `pool`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
