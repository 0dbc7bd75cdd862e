//! Shopify Admin API client.
//!
//! # Security
//!
//! The Admin API access token has write access to the store catalog. It is
//! held in a `SecretString` and only sent as the `X-Shopify-Access-Token`
//! header.
//!
//! # Architecture
//!
//! - [`CatalogApi`] is the seam the services depend on
//! - [`AdminClient`] implements it over GraphQL using `graphql_client` request bodies
//! - [`MockCatalog`] implements it in memory for tests
//! - Direct API calls to Shopify (no local product sync)
//!
//! # Example
//!
//! ```rust,ignore
//! use expiration_manager_admin::shopify::{AdminClient, CatalogApi, PageRequest};
//!
//! let client = AdminClient::new(&config.shopify);
//! let page = client.products_page(&PageRequest::first(10)).await?;
//! ```

mod admin;
pub mod mock;
pub mod types;

pub use admin::AdminClient;
pub use mock::MockCatalog;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Product catalog and metafield operations used by the services.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// One page of products with their app metafields.
    async fn products_page(
        &self,
        request: &PageRequest,
    ) -> Result<ProductConnection, AdminShopifyError>;

    /// A product by GID.
    async fn product(&self, id: &str) -> Result<Option<CatalogProduct>, AdminShopifyError>;

    /// The product's metafield at `(namespace, key)`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    async fn product_metafield(
        &self,
        product_id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<Metafield>, AdminShopifyError>;

    /// Create a metafield on a product.
    async fn create_metafield(
        &self,
        product_id: &str,
        input: &MetafieldInput,
    ) -> Result<Metafield, AdminShopifyError>;

    /// Overwrite the value of an existing product metafield.
    async fn update_metafield(
        &self,
        product_id: &str,
        existing: &Metafield,
        value: &str,
    ) -> Result<Metafield, AdminShopifyError>;

    /// The product metafield definition at `(namespace, key)`.
    async fn metafield_definition(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<MetafieldDefinition>, AdminShopifyError>;

    /// Create a product metafield definition.
    async fn create_metafield_definition(
        &self,
        input: &MetafieldDefinitionInput,
    ) -> Result<MetafieldDefinition, AdminShopifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_shopify_error_display() {
        let err = AdminShopifyError::NotFound("gid://shopify/Product/1".to_string());
        assert_eq!(err.to_string(), "Not found: gid://shopify/Product/1");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = AdminShopifyError::GraphQL(vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = AdminShopifyError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_user_error() {
        let err = AdminShopifyError::UserError("value: is invalid".to_string());
        assert_eq!(err.to_string(), "User error: value: is invalid");
    }
}
