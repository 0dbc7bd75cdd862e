//! In-process store implementations.
//!
//! Used by router and service tests, and by the integration test crate.
//! Semantics match the `PostgreSQL` repositories: ids are assigned
//! sequentially across all shops and never reused after a delete, and every
//! read is scoped to one shop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use expiration_manager_core::{LogId, ShopDomain};

use super::{AuditLogStore, RepositoryError, SettingsStore};
use crate::models::{AuditLog, NewAuditLog, Settings};

/// In-memory [`AuditLogStore`].
#[derive(Debug, Default)]
pub struct MemoryAuditLogStore {
    records: RwLock<Vec<AuditLog>>,
    /// Highest id ever assigned; never decreases, even after deletes.
    last_id: AtomicI32,
}

impl MemoryAuditLogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record across all shops, in insertion order.
    pub async fn all(&self) -> Vec<AuditLog> {
        self.records.read().await.clone()
    }
}

fn clamp_take(take: i64) -> usize {
    usize::try_from(take.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl AuditLogStore for MemoryAuditLogStore {
    async fn append(
        &self,
        shop: &ShopDomain,
        entry: NewAuditLog,
    ) -> Result<AuditLog, RepositoryError> {
        let mut records = self.records.write().await;
        // Taken under the write lock so ids stay in insertion order.
        let next = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = AuditLog {
            id: LogId::new(next),
            shop: shop.clone(),
            action: entry.action,
            description: entry.description,
            log_type: entry.log_type,
            occurred_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        shop: &ShopDomain,
        take: i64,
        cursor: Option<LogId>,
    ) -> Result<Vec<AuditLog>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| &r.shop == shop && cursor.is_none_or(|c| r.id > c))
            .take(clamp_take(take))
            .cloned()
            .collect())
    }

    async fn recent(&self, shop: &ShopDomain, take: i64) -> Result<Vec<AuditLog>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| &r.shop == shop)
            .take(clamp_take(take))
            .cloned()
            .collect())
    }

    async fn get(&self, id: LogId, shop: &ShopDomain) -> Result<Option<AuditLog>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.id == id && &r.shop == shop)
            .cloned())
    }

    async fn delete(&self, id: LogId, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.id == id && &r.shop == shop));
        Ok(records.len() < before)
    }
}

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    rows: RwLock<HashMap<ShopDomain, Settings>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, shop: &ShopDomain) -> Result<Option<Settings>, RepositoryError> {
        Ok(self.rows.read().await.get(shop).cloned())
    }

    async fn save(
        &self,
        shop: &ShopDomain,
        warning_period: i32,
    ) -> Result<(Settings, bool), RepositoryError> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();
        let inserted = !rows.contains_key(shop);
        let row = rows.entry(shop.clone()).or_insert_with(|| Settings {
            shop: shop.clone(),
            warning_period,
            created_at: now,
            updated_at: now,
        });
        row.warning_period = warning_period;
        row.updated_at = now;
        Ok((row.clone(), inserted))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn shop(name: &str) -> ShopDomain {
        ShopDomain::parse(&format!("{name}.myshopify.com")).unwrap()
    }

    async fn seeded(store: &MemoryAuditLogStore, shop: &ShopDomain, n: usize) {
        for i in 0..n {
            store
                .append(shop, NewAuditLog::success("test.action", format!("entry {i}")))
                .await
                .unwrap();
        }
    }

    fn ids(records: &[AuditLog]) -> Vec<i32> {
        records.iter().map(|r| r.id.as_i32()).collect()
    }

    #[tokio::test]
    async fn test_recent_returns_highest_ids_descending() {
        let store = MemoryAuditLogStore::new();
        let a = shop("a");
        seeded(&store, &a, 8).await;

        let recent = store.recent(&a, 5).await.unwrap();
        assert_eq!(ids(&recent), vec![8, 7, 6, 5, 4]);
    }

    #[tokio::test]
    async fn test_list_after_cursor_ascending() {
        let store = MemoryAuditLogStore::new();
        let a = shop("a");
        seeded(&store, &a, 10).await;

        let page = store.list(&a, 5, Some(LogId::new(3))).await.unwrap();
        assert_eq!(ids(&page), vec![4, 5, 6, 7, 8]);

        let first = store.list(&a, 3, None).await.unwrap();
        assert_eq!(ids(&first), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryAuditLogStore::new();
        let a = shop("a");
        seeded(&store, &a, 3).await;

        assert!(store.delete(LogId::new(3), &a).await.unwrap());
        let next = store
            .append(&a, NewAuditLog::success("test.action", "after delete"))
            .await
            .unwrap();

        assert_eq!(next.id, LogId::new(4));
        assert_eq!(ids(&store.list(&a, 10, None).await.unwrap()), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_reads_are_shop_scoped() {
        let store = MemoryAuditLogStore::new();
        let (a, b) = (shop("a"), shop("b"));
        seeded(&store, &a, 2).await;
        seeded(&store, &b, 2).await;

        assert_eq!(ids(&store.recent(&b, 10).await.unwrap()), vec![4, 3]);
        assert!(store.get(LogId::new(1), &b).await.unwrap().is_none());
        assert!(!store.delete(LogId::new(1), &b).await.unwrap());
        assert!(store.delete(LogId::new(1), &a).await.unwrap());
        assert!(store.get(LogId::new(1), &a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settings_get_unknown_shop_is_none() {
        let store = MemorySettingsStore::new();
        assert!(store.get(&shop("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settings_save_reports_insert_then_update() {
        let store = MemorySettingsStore::new();
        let a = shop("a");

        let (first, inserted) = store.save(&a, 5).await.unwrap();
        assert!(inserted);
        assert_eq!(first.warning_period, 5);

        let (second, inserted) = store.save(&a, 10).await.unwrap();
        assert!(!inserted);
        assert_eq!(second.warning_period, 10);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.get(&a).await.unwrap().unwrap().warning_period, 10);
    }
}
