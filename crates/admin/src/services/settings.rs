//! Per-shop settings.

use std::sync::Arc;

use tracing::{info, instrument};

use expiration_manager_core::ShopDomain;

use super::ServiceError;
use crate::db::{AuditLogStore, SettingsStore};
use crate::models::{NewAuditLog, Settings, SettingsView};

/// Reads and saves the shop's warning period.
#[derive(Clone)]
pub struct SettingsService {
    settings: Arc<dyn SettingsStore>,
    logs: Arc<dyn AuditLogStore>,
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>, logs: Arc<dyn AuditLogStore>) -> Self {
        Self { settings, logs }
    }

    /// Settings for `shop` with the default warning period applied.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub async fn get(&self, shop: &ShopDomain) -> Result<SettingsView, ServiceError> {
        let stored = self.settings.get(shop).await?;
        Ok(SettingsView::resolve(shop, stored))
    }

    /// Save the warning period and record an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `warning_period` is not positive.
    #[instrument(skip(self), fields(shop = %shop))]
    pub async fn save(
        &self,
        shop: &ShopDomain,
        warning_period: i32,
    ) -> Result<Settings, ServiceError> {
        if warning_period <= 0 {
            return Err(ServiceError::Validation(format!(
                "warningPeriod must be a positive number of days (got {warning_period})"
            )));
        }

        let (settings, inserted) = self.settings.save(shop, warning_period).await?;

        let payload = serde_json::json!(&settings);
        let entry = if inserted {
            NewAuditLog::success("app.settings.add", format!("App settings added: {payload}"))
        } else {
            NewAuditLog::success(
                "app.settings.update",
                format!("App settings updated to: {payload}"),
            )
        };
        self.logs.append(shop, entry).await?;

        info!(warning_period, inserted, "Saved settings");
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::{MemoryAuditLogStore, MemorySettingsStore};

    fn fixture() -> (SettingsService, Arc<MemoryAuditLogStore>, ShopDomain) {
        let logs = Arc::new(MemoryAuditLogStore::new());
        let service = SettingsService::new(Arc::new(MemorySettingsStore::new()), logs.clone());
        (
            service,
            logs,
            ShopDomain::parse("store.myshopify.com").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_defaults_to_seven_days() {
        let (service, _, shop) = fixture();
        let view = service.get(&shop).await.unwrap();
        assert_eq!(view.warning_period, 7);
        assert!(!view.saved);
    }

    #[tokio::test]
    async fn test_save_logs_add_then_update() {
        let (service, logs, shop) = fixture();

        service.save(&shop, 5).await.unwrap();
        service.save(&shop, 12).await.unwrap();

        let logs = logs.all().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "app.settings.add");
        let added: serde_json::Value = serde_json::from_str(
            logs[0]
                .description
                .strip_prefix("App settings added: ")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(added["shop"], "store.myshopify.com");
        assert_eq!(added["warningPeriod"], 5);
        assert!(added["createdAt"].is_string());

        assert_eq!(logs[1].action, "app.settings.update");
        let updated: serde_json::Value = serde_json::from_str(
            logs[1]
                .description
                .strip_prefix("App settings updated to: ")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(updated["warningPeriod"], 12);
        assert!(updated["updatedAt"].is_string());
        assert_eq!(service.get(&shop).await.unwrap().warning_period, 12);
    }

    #[tokio::test]
    async fn test_save_rejects_non_positive_period() {
        let (service, logs, shop) = fixture();
        for period in [0, -3] {
            assert!(matches!(
                service.save(&shop, period).await,
                Err(ServiceError::Validation(_))
            ));
        }
        assert!(logs.all().await.is_empty());
    }
}
