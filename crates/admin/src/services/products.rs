//! Catalog reads enriched with derived expiration status.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, instrument};

use expiration_manager_core::{
    AlertWindow, ExpirationField, ExpirationState, ProductFilter, ShopDomain, alert_window,
    default_warning_date, evaluate, parse_attribute_instant, parse_status_flag,
};

use super::ServiceError;
use crate::db::SettingsStore;
use crate::models::SettingsView;
use crate::shopify::{
    AdminShopifyError, CatalogApi, CatalogProduct, GraphQLError, Metafield, PageInfo, PageRequest,
};

/// What to do when a catalog page fails mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFetchError {
    /// Log the error and return an empty list.
    ReturnEmpty,
    /// Return the error to the caller.
    Propagate,
}

/// A product with its app metafield values and derived flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    #[serde(flatten)]
    pub product: CatalogProduct,
    pub expiration_date: Option<String>,
    pub expiration_alert_date: Option<String>,
    pub expiration_status: bool,
    #[serde(flatten)]
    pub state: ExpirationState,
}

impl TrackedProduct {
    /// Derive status fields for `product` at `now`.
    #[must_use]
    pub fn enrich(product: CatalogProduct, now: DateTime<Utc>) -> Self {
        let expiration_date = non_empty(product.metafield_value(ExpirationField::ExpirationDate));
        let expiration_alert_date = non_empty(product.metafield_value(ExpirationField::WarningDate));
        let expiration_status = parse_status_flag(product.metafield_value(ExpirationField::Status));

        let state = evaluate(
            now,
            expiration_date.as_deref().and_then(parse_attribute_instant),
            expiration_alert_date
                .as_deref()
                .and_then(parse_attribute_instant),
        );

        Self {
            product,
            expiration_date,
            expiration_alert_date,
            expiration_status,
            state,
        }
    }

    /// Whether this product belongs in `filter`.
    #[must_use]
    pub const fn matches(&self, filter: ProductFilter) -> bool {
        match filter {
            ProductFilter::All => true,
            ProductFilter::Active => self.expiration_status,
            ProductFilter::Inactive => !self.expiration_status,
            ProductFilter::Expired => self.state.expired,
            ProductFilter::Expiring => self.state.expiring_soon,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// One enriched page in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<TrackedProduct>,
    pub page_info: PageInfo,
}

/// Dashboard counters over the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub active: usize,
    pub inactive: usize,
    pub expired: usize,
    pub expire_soon: usize,
}

impl ProductStats {
    /// Count `products` per category.
    #[must_use]
    pub fn tally(products: &[TrackedProduct]) -> Self {
        products.iter().fold(Self::default(), |mut stats, p| {
            if p.expiration_status {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            if p.state.expired {
                stats.expired += 1;
            }
            if p.state.expiring_soon {
                stats.expire_soon += 1;
            }
            stats
        })
    }
}

/// Single product view for the edit page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: TrackedProduct,
    pub expiration_date_metafield: Option<Metafield>,
    pub warning_date_metafield: Option<Metafield>,
    pub expiration_status_metafield: Option<Metafield>,
    pub settings: SettingsView,
    /// Expiration date minus the shop's warning period.
    pub suggested_warning_date: Option<NaiveDate>,
    /// Days on which the product shows as expiring.
    pub alert_window: Option<AlertWindow>,
}

/// Reads products from the catalog.
#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn CatalogApi>,
    settings: Arc<dyn SettingsStore>,
    page_limit: i64,
}

impl ProductService {
    /// Create a new product service. `page_limit` is the page size used for
    /// full scans.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        settings: Arc<dyn SettingsStore>,
        page_limit: i64,
    ) -> Self {
        Self {
            catalog,
            settings,
            page_limit,
        }
    }

    /// Page through the whole catalog, then keep products matching `filter`.
    ///
    /// `ProductFilter::All` keeps upstream order. Pages are fetched one at a
    /// time until `hasNextPage` is false.
    ///
    /// # Errors
    ///
    /// With `OnFetchError::Propagate`, returns the first failed page's error.
    /// A page that reports more results but no `endCursor` counts as failed.
    #[instrument(skip(self, now))]
    pub async fn fetch_all(
        &self,
        filter: ProductFilter,
        on_error: OnFetchError,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrackedProduct>, ServiceError> {
        match self.scan(now).await {
            Ok(products) => Ok(products.into_iter().filter(|p| p.matches(filter)).collect()),
            Err(e) => match on_error {
                OnFetchError::ReturnEmpty => {
                    error!(error = %e, "Product scan failed, returning empty list");
                    Ok(Vec::new())
                }
                OnFetchError::Propagate => Err(e),
            },
        }
    }

    async fn scan(&self, now: DateTime<Utc>) -> Result<Vec<TrackedProduct>, ServiceError> {
        let mut all = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .catalog
                .products_page(&PageRequest::Forward {
                    first: self.page_limit,
                    after: after.take(),
                })
                .await?;

            all.extend(
                page.products
                    .into_iter()
                    .map(|p| TrackedProduct::enrich(p, now)),
            );

            if !page.page_info.has_next_page {
                break;
            }
            match page.page_info.end_cursor {
                Some(cursor) => after = Some(cursor),
                None => {
                    return Err(AdminShopifyError::GraphQL(vec![GraphQLError::message(
                        "products page has a next page but no endCursor",
                    )])
                    .into());
                }
            }
        }

        Ok(all)
    }

    /// Fetch exactly one page in the requested direction. No filtering.
    ///
    /// # Errors
    ///
    /// Returns the upstream error.
    #[instrument(skip(self, now))]
    pub async fn fetch_page(
        &self,
        request: &PageRequest,
        now: DateTime<Utc>,
    ) -> Result<ProductPage, ServiceError> {
        let page = self.catalog.products_page(request).await?;
        Ok(ProductPage {
            products: page
                .products
                .into_iter()
                .map(|p| TrackedProduct::enrich(p, now))
                .collect(),
            page_info: page.page_info,
        })
    }

    /// Category counts over the whole catalog. A failed scan counts as empty.
    ///
    /// # Errors
    ///
    /// Upstream errors are logged and counted as an empty catalog, so this
    /// currently always returns `Ok`.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<ProductStats, ServiceError> {
        let products = self
            .fetch_all(ProductFilter::All, OnFetchError::ReturnEmpty, now)
            .await?;
        Ok(ProductStats::tally(&products))
    }

    /// One product with its metafields and the shop's effective settings.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    #[instrument(skip(self, now), fields(shop = %shop))]
    pub async fn detail(
        &self,
        shop: &ShopDomain,
        product_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ProductDetail, ServiceError> {
        let product = self
            .catalog
            .product(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id}")))?;
        let settings = SettingsView::resolve(shop, self.settings.get(shop).await?);

        let tracked = TrackedProduct::enrich(product, now);
        let metafield = |field| tracked.product.metafield(field).cloned();
        let expiration_date_metafield = metafield(ExpirationField::ExpirationDate);
        let warning_date_metafield = metafield(ExpirationField::WarningDate);
        let expiration_status_metafield = metafield(ExpirationField::Status);

        let expiration_day = tracked
            .expiration_date
            .as_deref()
            .and_then(parse_attribute_instant)
            .map(|instant| instant.date_naive());
        let warning_day = tracked
            .expiration_alert_date
            .as_deref()
            .and_then(parse_attribute_instant)
            .map(|instant| instant.date_naive());

        let suggested_warning_date =
            expiration_day.and_then(|exp| default_warning_date(exp, settings.warning_period));
        let alert_window = match (warning_day, expiration_day) {
            (Some(warn), Some(exp)) => alert_window(warn, exp),
            _ => None,
        };

        Ok(ProductDetail {
            product: tracked,
            expiration_date_metafield,
            warning_date_metafield,
            expiration_status_metafield,
            settings,
            suggested_warning_date,
            alert_window,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::db::MemorySettingsStore;
    use crate::shopify::mock::{MockCatalog, product, product_with};

    use ExpirationField::{ExpirationDate, Status, WarningDate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 28, 12, 0, 0).unwrap()
    }

    fn service(catalog: Arc<MockCatalog>, page_limit: i64) -> ProductService {
        ProductService::new(catalog, Arc::new(MemorySettingsStore::new()), page_limit)
    }

    /// 1: active+expiring, 2: active+expired, 3: inactive, 4: inactive+expired
    fn mixed_catalog() -> MockCatalog {
        MockCatalog::with_products(vec![
            product_with(
                1,
                &[
                    (ExpirationDate, "2026-06-01"),
                    (WarningDate, "2026-05-25"),
                    (Status, "true"),
                ],
            ),
            product_with(2, &[(ExpirationDate, "2026-05-01"), (Status, "true")]),
            product(3),
            product_with(4, &[(ExpirationDate, "2026-01-01"), (Status, "false")]),
        ])
    }

    fn numeric_ids(products: &[TrackedProduct]) -> Vec<String> {
        products
            .iter()
            .map(|p| p.product.id.trim_start_matches("gid://shopify/Product/").to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_pages_until_done() {
        let catalog = Arc::new(MockCatalog::with_products((1..=537).map(product).collect()));
        let service = service(catalog.clone(), 250);

        let all = service
            .fetch_all(ProductFilter::All, OnFetchError::Propagate, now())
            .await
            .unwrap();

        assert_eq!(all.len(), 537);
        assert_eq!(catalog.page_calls(), 3);
        assert_eq!(all[0].product.id, "gid://shopify/Product/1");
        assert_eq!(all[536].product.id, "gid://shopify/Product/537");
    }

    #[tokio::test]
    async fn test_fetch_all_filters() {
        let service = service(Arc::new(mixed_catalog()), 2);

        let cases = [
            (ProductFilter::All, vec!["1", "2", "3", "4"]),
            (ProductFilter::Active, vec!["1", "2"]),
            (ProductFilter::Inactive, vec!["3", "4"]),
            (ProductFilter::Expired, vec!["2", "4"]),
            (ProductFilter::Expiring, vec!["1"]),
        ];
        for (filter, expected) in cases {
            let products = service
                .fetch_all(filter, OnFetchError::Propagate, now())
                .await
                .unwrap();
            assert_eq!(numeric_ids(&products), expected, "filter {filter}");
        }
    }

    #[tokio::test]
    async fn test_fetch_all_error_policy() {
        let catalog = Arc::new(mixed_catalog());
        catalog.set_fail_on_read(true).await;
        let service = service(catalog, 250);

        let empty = service
            .fetch_all(ProductFilter::All, OnFetchError::ReturnEmpty, now())
            .await
            .unwrap();
        assert!(empty.is_empty());

        let result = service
            .fetch_all(ProductFilter::All, OnFetchError::Propagate, now())
            .await;
        assert!(matches!(result, Err(ServiceError::Shopify(_))));
    }

    #[tokio::test]
    async fn test_missing_end_cursor_fails_the_scan() {
        let catalog = Arc::new(MockCatalog::with_products((1..=5).map(product).collect()));
        catalog.set_omit_end_cursor(true).await;
        let service = service(catalog.clone(), 2);

        let result = service
            .fetch_all(ProductFilter::All, OnFetchError::Propagate, now())
            .await;
        assert!(matches!(result, Err(ServiceError::Shopify(_))));
        assert_eq!(catalog.page_calls(), 1);

        let empty = service
            .fetch_all(ProductFilter::All, OnFetchError::ReturnEmpty, now())
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let service = service(Arc::new(mixed_catalog()), 250);
        let stats = service.stats(now()).await.unwrap();
        assert_eq!(
            stats,
            ProductStats {
                active: 2,
                inactive: 2,
                expired: 2,
                expire_soon: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_page_backward() {
        let service = service(Arc::new(mixed_catalog()), 250);
        let page = service
            .fetch_page(
                &PageRequest::Backward {
                    last: 2,
                    before: None,
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(numeric_ids(&page.products), ["3", "4"]);
        assert!(page.page_info.has_previous_page);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_enrich_treats_malformed_dates_as_missing() {
        let tracked = TrackedProduct::enrich(
            product_with(9, &[(ExpirationDate, "soon"), (Status, "TRUE")]),
            now(),
        );
        assert_eq!(tracked.expiration_date.as_deref(), Some("soon"));
        assert!(!tracked.state.expired);
        assert!(!tracked.expiration_status);
    }

    #[tokio::test]
    async fn test_tracked_product_json_shape() {
        let tracked = TrackedProduct::enrich(
            product_with(1, &[(ExpirationDate, "2026-06-01"), (WarningDate, "2026-05-25")]),
            now(),
        );
        let json = serde_json::to_value(&tracked).unwrap();
        assert_eq!(json["id"], "gid://shopify/Product/1");
        assert_eq!(json["expirationDate"], "2026-06-01");
        assert_eq!(json["expirationAlertDate"], "2026-05-25");
        assert_eq!(json["expiringSoon"], true);
        assert_eq!(json["expired"], false);
    }

    #[tokio::test]
    async fn test_detail() {
        let catalog = Arc::new(mixed_catalog());
        let settings = Arc::new(MemorySettingsStore::new());
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        settings.save(&shop, 3).await.unwrap();
        let service = ProductService::new(catalog, settings, 250);

        let detail = service
            .detail(&shop, "gid://shopify/Product/1", now())
            .await
            .unwrap();

        assert!(detail.product.state.expiring_soon);
        assert_eq!(detail.settings.warning_period, 3);
        assert_eq!(
            detail.suggested_warning_date,
            NaiveDate::from_ymd_opt(2026, 5, 29)
        );
        assert_eq!(
            detail.alert_window.map(|w| w.to),
            NaiveDate::from_ymd_opt(2026, 5, 31)
        );
        assert!(detail.expiration_status_metafield.is_some());

        let missing = service
            .detail(&shop, "gid://shopify/Product/99", now())
            .await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }
}
