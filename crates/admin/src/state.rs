//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use expiration_manager_core::ShopDomain;

use crate::config::AdminConfig;
use crate::db::{AuditLogStore, PgAuditLogRepository, PgSettingsRepository, SettingsStore};
use crate::services::{MetafieldService, ProductService, SettingsService};
use crate::shopify::{AdminClient, CatalogApi};

/// Application state shared across all handlers.
///
/// Cheap to clone; all clones share one set of backends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    shop: ShopDomain,
    pool: Option<PgPool>,
    logs: Arc<dyn AuditLogStore>,
    products: ProductService,
    metafields: MetafieldService,
    settings: SettingsService,
}

impl AppState {
    /// Production state: Shopify Admin API plus `PostgreSQL` stores.
    #[must_use]
    pub fn new(config: &AdminConfig, pool: PgPool) -> Self {
        let catalog: Arc<dyn CatalogApi> = Arc::new(AdminClient::new(&config.shopify));
        let logs: Arc<dyn AuditLogStore> = Arc::new(PgAuditLogRepository::new(pool.clone()));
        let settings: Arc<dyn SettingsStore> = Arc::new(PgSettingsRepository::new(pool.clone()));

        Self::with_backends(
            config.shop().clone(),
            config.products_page_limit,
            catalog,
            logs,
            settings,
            Some(pool),
        )
    }

    /// State over arbitrary backends. `pool` is only used by the readiness
    /// probe; pass `None` when the stores are not database-backed.
    #[must_use]
    pub fn with_backends(
        shop: ShopDomain,
        page_limit: i64,
        catalog: Arc<dyn CatalogApi>,
        logs: Arc<dyn AuditLogStore>,
        settings: Arc<dyn SettingsStore>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                shop,
                pool,
                products: ProductService::new(catalog.clone(), settings.clone(), page_limit),
                metafields: MetafieldService::new(catalog, logs.clone(), settings.clone()),
                settings: SettingsService::new(settings, logs.clone()),
                logs,
            }),
        }
    }

    /// The shop this instance serves.
    #[must_use]
    pub fn shop(&self) -> &ShopDomain {
        &self.inner.shop
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn logs(&self) -> &dyn AuditLogStore {
        self.inner.logs.as_ref()
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    #[must_use]
    pub fn metafields(&self) -> &MetafieldService {
        &self.inner.metafields
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.inner.settings
    }
}
