//! Integration test helpers for Expiration Manager.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p expiration-manager-integration-tests
//!
//! # Include the PostgreSQL store tests
//! TEST_DATABASE_URL=postgres://localhost/expiration_manager_test \
//!     cargo test -p expiration-manager-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_sync` - Product scans, filters and metafield writes against the mock catalog
//! - `admin_api` - Full router (with tracing layer) over in-memory backends
//! - `postgres_stores` - Audit log and settings repositories against a real database

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use secrecy::SecretString;
use sqlx::PgPool;
use tower::ServiceExt;

use expiration_manager_admin::{
    db::{MemoryAuditLogStore, MemorySettingsStore, create_pool, run_migrations},
    services::{MetafieldService, ProductService, SettingsService},
    shopify::MockCatalog,
    state::AppState,
};
use expiration_manager_core::ShopDomain;

/// Shop every test acts for.
pub const SHOP: &str = "store.myshopify.com";

#[must_use]
pub fn shop() -> ShopDomain {
    ShopDomain::parse(SHOP).unwrap()
}

/// Services wired to a mock catalog and in-memory stores.
pub struct Harness {
    pub catalog: Arc<MockCatalog>,
    pub logs: Arc<MemoryAuditLogStore>,
    pub settings_store: Arc<MemorySettingsStore>,
    pub products: ProductService,
    pub metafields: MetafieldService,
    pub settings: SettingsService,
}

impl Harness {
    #[must_use]
    pub fn new(catalog: MockCatalog, page_limit: i64) -> Self {
        let catalog = Arc::new(catalog);
        let logs = Arc::new(MemoryAuditLogStore::new());
        let settings_store = Arc::new(MemorySettingsStore::new());
        Self {
            products: ProductService::new(catalog.clone(), settings_store.clone(), page_limit),
            metafields: MetafieldService::new(
                catalog.clone(),
                logs.clone(),
                settings_store.clone(),
            ),
            settings: SettingsService::new(settings_store.clone(), logs.clone()),
            catalog,
            logs,
            settings_store,
        }
    }

    /// The full application router over this harness's backends.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState::with_backends(
            shop(),
            250,
            self.catalog.clone(),
            self.logs.clone(),
            self.settings_store.clone(),
            None,
        );
        expiration_manager_admin::app(state)
    }
}

/// Send one request through `router`.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[must_use]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Connect to `TEST_DATABASE_URL` and apply migrations.
///
/// Returns `None` when the variable is unset so database tests can skip.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to TEST_DATABASE_URL");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// A shop domain unique to one test, so database tests do not see each
/// other's rows.
#[must_use]
pub fn unique_shop(test: &str) -> ShopDomain {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let handle = test.replace('_', "-");
    ShopDomain::parse(&format!("{handle}-{nanos}.myshopify.com")).unwrap()
}
