//! Metafield definition bootstrap.
//!
//! Creates the product metafield definitions for the expiration date, alert
//! date and status fields if they do not exist yet. The admin server does the
//! same on startup; this command lets it run ahead of a deploy.
//!
//! # Usage
//!
//! ```bash
//! em-cli definitions
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE` - Shopify store domain
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access token
//! - `SHOPIFY_API_VERSION` - API version (optional)

use std::sync::Arc;

use expiration_manager_admin::{
    config::{ConfigError, ShopifyAdminConfig},
    db::{MemoryAuditLogStore, MemorySettingsStore},
    services::{MetafieldService, ServiceError},
    shopify::AdminClient,
};
use thiserror::Error;

/// Errors that can occur while bootstrapping definitions.
#[derive(Debug, Error)]
pub enum DefinitionsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Shopify error: {0}")]
    Service(#[from] ServiceError),
}

/// Ensure every app metafield definition exists.
///
/// # Errors
///
/// Returns `DefinitionsError` if configuration is missing or Shopify rejects
/// a call. Definitions created before the failure remain.
pub async fn run() -> Result<(), DefinitionsError> {
    let _ = dotenvy::dotenv();

    let config = ShopifyAdminConfig::from_env()?;
    tracing::info!(shop = %config.store, "Checking metafield definitions...");

    // Definition bootstrap writes no audit records or settings.
    let service = MetafieldService::new(
        Arc::new(AdminClient::new(&config)),
        Arc::new(MemoryAuditLogStore::new()),
        Arc::new(MemorySettingsStore::new()),
    );

    for outcome in service.ensure_definitions().await? {
        if outcome.created {
            tracing::info!(key = outcome.field.key(), "Created metafield definition");
        } else {
            tracing::info!(key = outcome.field.key(), "Metafield definition already exists");
        }
    }

    tracing::info!("Metafield definitions ready!");
    Ok(())
}
