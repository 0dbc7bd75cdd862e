//! Business logic services for admin.
//!
//! # Services
//!
//! - `metafields` - Expiration metafield upserts, definition bootstrap, activation
//! - `products` - Catalog paging, filtering and status enrichment
//! - `settings` - Per-shop warning period with audit entries
//!
//! Services hold `Arc<dyn ...>` handles to the catalog and stores so the
//! same code runs against Shopify/`PostgreSQL` and the in-memory test doubles.

pub mod metafields;
pub mod products;
pub mod settings;

use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::AdminShopifyError;

pub use metafields::{DefinitionOutcome, MetafieldService, SaveExpirationOutcome, UpsertOutcome};
pub use products::{
    OnFetchError, ProductDetail, ProductPage, ProductService, ProductStats, TrackedProduct,
};
pub use settings::SettingsService;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Shopify call failed.
    #[error(transparent)]
    Shopify(#[from] AdminShopifyError),

    /// Database call failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Input rejected before any upstream call.
    #[error("{0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl From<expiration_manager_core::FieldValueError> for ServiceError {
    fn from(err: expiration_manager_core::FieldValueError) -> Self {
        Self::Validation(err.to_string())
    }
}
