//! Expiration metafield writes.
//!
//! Every successful write appends exactly one audit record. A failed
//! upstream call writes nothing to the audit log.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument, warn};

use expiration_manager_core::{
    DEFAULT_WARNING_PERIOD_DAYS, ExpirationField, FieldValue, ShopDomain, default_warning_date,
};

use super::ServiceError;
use crate::db::{AuditLogStore, SettingsStore};
use crate::models::NewAuditLog;
use crate::shopify::{CatalogApi, Metafield, MetafieldDefinitionInput, MetafieldInput};

/// Result of a single upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub metafield: Metafield,
    pub was_created: bool,
}

/// Result of saving both dates for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveExpirationOutcome {
    pub expiration_date: UpsertOutcome,
    pub warning_date: UpsertOutcome,
}

/// Result of bootstrapping one metafield definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionOutcome {
    pub field: ExpirationField,
    pub created: bool,
}

/// Writes the app's product metafields.
#[derive(Clone)]
pub struct MetafieldService {
    catalog: Arc<dyn CatalogApi>,
    logs: Arc<dyn AuditLogStore>,
    settings: Arc<dyn SettingsStore>,
}

impl MetafieldService {
    /// Create a new metafield service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        logs: Arc<dyn AuditLogStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            catalog,
            logs,
            settings,
        }
    }

    /// Create the metafield if the product has none at `field`, otherwise
    /// update the existing one by id.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `value` does not match the field type, or the
    /// upstream/storage error that stopped the write.
    #[instrument(skip(self, value), fields(shop = %shop, product_id = %product_id, key = field.key()))]
    pub async fn upsert(
        &self,
        shop: &ShopDomain,
        product_id: &str,
        field: ExpirationField,
        value: &FieldValue,
    ) -> Result<UpsertOutcome, ServiceError> {
        value.check_for(field)?;

        let existing = self
            .catalog
            .product_metafield(product_id, field.namespace(), field.key())
            .await?;

        let raw = value.to_metafield_value();
        let (metafield, was_created) = match existing {
            Some(existing) => (
                self.catalog
                    .update_metafield(product_id, &existing, &raw)
                    .await?,
                false,
            ),
            None => {
                let input = MetafieldInput {
                    namespace: field.namespace().to_string(),
                    key: field.key().to_string(),
                    value_type: field.value_type(),
                    value: raw,
                };
                (
                    self.catalog.create_metafield(product_id, &input).await?,
                    true,
                )
            }
        };

        self.logs
            .append(
                shop,
                NewAuditLog::success(
                    field.audit_action(was_created),
                    field.audit_description(was_created, value),
                ),
            )
            .await?;

        info!(was_created, "Upserted product metafield");
        Ok(UpsertOutcome {
            metafield,
            was_created,
        })
    }

    /// Save the expiration date and warning date for a product.
    ///
    /// Without an explicit `warning`, the warning date is the expiration date
    /// minus the shop's warning period. The expiration date is written first;
    /// if the warning write then fails, the expiration write stays applied.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the warning date is after the expiration date.
    #[instrument(skip(self), fields(shop = %shop, product_id = %product_id))]
    pub async fn save_expiration(
        &self,
        shop: &ShopDomain,
        product_id: &str,
        expiration: NaiveDate,
        warning: Option<NaiveDate>,
    ) -> Result<SaveExpirationOutcome, ServiceError> {
        let warning = match warning {
            Some(date) => date,
            None => {
                let days = self
                    .settings
                    .get(shop)
                    .await?
                    .map_or(DEFAULT_WARNING_PERIOD_DAYS, |s| s.warning_period);
                default_warning_date(expiration, days).ok_or_else(|| {
                    ServiceError::Validation("warning date out of range".to_string())
                })?
            }
        };

        if warning > expiration {
            return Err(ServiceError::Validation(format!(
                "warning date {warning} is after expiration date {expiration}"
            )));
        }

        let expiration_date = self
            .upsert(
                shop,
                product_id,
                ExpirationField::ExpirationDate,
                &FieldValue::Date(expiration),
            )
            .await?;
        let warning_date = self
            .upsert(
                shop,
                product_id,
                ExpirationField::WarningDate,
                &FieldValue::Date(warning),
            )
            .await?;

        Ok(SaveExpirationOutcome {
            expiration_date,
            warning_date,
        })
    }

    /// Switch expiration tracking on or off for a product.
    ///
    /// Activation requires at least one stored date. Appends an
    /// `activate`/`deactivate` record after the status upsert's own record.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when activating a product without dates.
    #[instrument(skip(self), fields(shop = %shop, product_id = %product_id))]
    pub async fn set_status(
        &self,
        shop: &ShopDomain,
        product_id: &str,
        active: bool,
    ) -> Result<UpsertOutcome, ServiceError> {
        if active {
            let mut has_date = false;
            for field in [ExpirationField::ExpirationDate, ExpirationField::WarningDate] {
                if self
                    .catalog
                    .product_metafield(product_id, field.namespace(), field.key())
                    .await?
                    .is_some()
                {
                    has_date = true;
                    break;
                }
            }
            if !has_date {
                return Err(ServiceError::Validation(
                    "set an expiration date before activating".to_string(),
                ));
            }
        }

        let outcome = self
            .upsert(
                shop,
                product_id,
                ExpirationField::Status,
                &FieldValue::Flag(active),
            )
            .await?;

        let verb = if active { "activate" } else { "deactivate" };
        self.logs
            .append(
                shop,
                NewAuditLog::success(
                    format!("product.expiration_date.{verb}"),
                    format!("Product: {product_id} - Expiration date {verb}d"),
                ),
            )
            .await?;

        Ok(outcome)
    }

    /// Create any missing product metafield definitions for the app's fields.
    ///
    /// # Errors
    ///
    /// Returns the first upstream error; definitions created before it remain.
    #[instrument(skip(self))]
    pub async fn ensure_definitions(&self) -> Result<Vec<DefinitionOutcome>, ServiceError> {
        let mut outcomes = Vec::with_capacity(ExpirationField::ALL.len());

        for field in ExpirationField::ALL {
            let existing = self
                .catalog
                .metafield_definition(field.namespace(), field.key())
                .await?;

            let created = if existing.is_some() {
                false
            } else {
                let input = MetafieldDefinitionInput {
                    name: field.definition_name().to_string(),
                    namespace: field.namespace().to_string(),
                    key: field.key().to_string(),
                    description: field.description().to_string(),
                    value_type: field.value_type(),
                };
                match self.catalog.create_metafield_definition(&input).await {
                    Ok(definition) => {
                        info!(id = %definition.id, key = field.key(), "Created metafield definition");
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, key = field.key(), "Failed to create metafield definition");
                        return Err(e.into());
                    }
                }
            };

            outcomes.push(DefinitionOutcome { field, created });
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::{MemoryAuditLogStore, MemorySettingsStore};
    use crate::shopify::mock::{MockCatalog, product, product_with};

    const PRODUCT: &str = "gid://shopify/Product/1";

    struct Fixture {
        catalog: Arc<MockCatalog>,
        logs: Arc<MemoryAuditLogStore>,
        settings: Arc<MemorySettingsStore>,
        service: MetafieldService,
        shop: ShopDomain,
    }

    fn fixture(catalog: MockCatalog) -> Fixture {
        let catalog = Arc::new(catalog);
        let logs = Arc::new(MemoryAuditLogStore::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let service = MetafieldService::new(catalog.clone(), logs.clone(), settings.clone());
        Fixture {
            catalog,
            logs,
            settings,
            service,
            shop: ShopDomain::parse("store.myshopify.com").unwrap(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));
        let value = FieldValue::Date(day(2026, 6, 1));

        let first = f
            .service
            .upsert(&f.shop, PRODUCT, ExpirationField::ExpirationDate, &value)
            .await
            .unwrap();
        assert!(first.was_created);
        assert_eq!(first.metafield.value, "2026-06-01");
        assert_eq!(first.metafield.value_type, "date");

        let second = f
            .service
            .upsert(&f.shop, PRODUCT, ExpirationField::ExpirationDate, &value)
            .await
            .unwrap();
        assert!(!second.was_created);
        assert_eq!(second.metafield.id, first.metafield.id);

        let logs = f.logs.all().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "product.expiration_date.add");
        assert_eq!(logs[0].description, "Add product expiration date - 2026-06-01");
        assert_eq!(logs[1].action, "product.expiration_date.update");

        let stored = f.catalog.stored_product(PRODUCT).await.unwrap();
        assert_eq!(stored.metafields.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_type_mismatch_makes_no_calls() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));

        let result = f
            .service
            .upsert(&f.shop, PRODUCT, ExpirationField::Status, &FieldValue::Date(day(2026, 1, 1)))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(f.catalog.metafield_writes(), 0);
        assert!(f.logs.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_upstream_failure_writes_no_audit() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));
        f.catalog.set_fail_on_write(true).await;

        let result = f
            .service
            .upsert(&f.shop, PRODUCT, ExpirationField::Status, &FieldValue::Flag(true))
            .await;

        assert!(matches!(result, Err(ServiceError::Shopify(_))));
        assert!(f.logs.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_expiration_defaults_warning_from_settings() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));
        f.settings.save(&f.shop, 30).await.unwrap();

        let outcome = f
            .service
            .save_expiration(&f.shop, PRODUCT, day(2026, 3, 5), None)
            .await
            .unwrap();

        assert_eq!(outcome.warning_date.metafield.value, "2026-02-03");
        assert_eq!(f.logs.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_save_expiration_uses_seven_day_default() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));

        let outcome = f
            .service
            .save_expiration(&f.shop, PRODUCT, day(2026, 3, 5), None)
            .await
            .unwrap();

        assert_eq!(outcome.warning_date.metafield.value, "2026-02-26");
    }

    #[tokio::test]
    async fn test_save_expiration_rejects_late_warning() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));

        let result = f
            .service
            .save_expiration(&f.shop, PRODUCT, day(2026, 3, 5), Some(day(2026, 3, 6)))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(f.catalog.metafield_writes(), 0);
    }

    #[tokio::test]
    async fn test_activate_requires_a_date() {
        let f = fixture(MockCatalog::with_products(vec![product(1)]));

        let result = f.service.set_status(&f.shop, PRODUCT, true).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // Deactivating is always allowed
        let outcome = f.service.set_status(&f.shop, PRODUCT, false).await.unwrap();
        assert_eq!(outcome.metafield.value, "false");
    }

    #[tokio::test]
    async fn test_activate_logs_status_and_activation() {
        let f = fixture(MockCatalog::with_products(vec![product_with(
            1,
            &[(ExpirationField::ExpirationDate, "2026-06-01")],
        )]));

        let outcome = f.service.set_status(&f.shop, PRODUCT, true).await.unwrap();
        assert!(outcome.was_created);

        let logs = f.logs.all().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "product.expiration_status.add");
        assert_eq!(logs[1].action, "product.expiration_date.activate");
        assert_eq!(
            logs[1].description,
            "Product: gid://shopify/Product/1 - Expiration date activated"
        );
    }

    #[tokio::test]
    async fn test_ensure_definitions_is_idempotent() {
        let f = fixture(MockCatalog::new());

        let first = f.service.ensure_definitions().await.unwrap();
        assert!(first.iter().all(|o| o.created));
        assert_eq!(f.catalog.definitions().await.len(), 3);

        let second = f.service.ensure_definitions().await.unwrap();
        assert!(second.iter().all(|o| !o.created));
        assert_eq!(f.catalog.definitions().await.len(), 3);

        let names: Vec<_> = f
            .catalog
            .definitions()
            .await
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["Expiration Date", "Alert Date", "Expiration Status"]);
    }
}
