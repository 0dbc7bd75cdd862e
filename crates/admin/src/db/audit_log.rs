//! Audit log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use expiration_manager_core::{LogId, LogType, ShopDomain};

use super::{AuditLogStore, RepositoryError};
use crate::models::{AuditLog, NewAuditLog};

#[derive(Debug, sqlx::FromRow)]
struct AuditLogRow {
    id: i32,
    shop: ShopDomain,
    action: String,
    description: String,
    #[sqlx(rename = "type")]
    log_type: LogType,
    occurred_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditLog {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: LogId::new(row.id),
            shop: row.shop,
            action: row.action,
            description: row.description,
            log_type: row.log_type,
            occurred_at: row.occurred_at,
        }
    }
}

/// `PostgreSQL`-backed [`AuditLogStore`].
#[derive(Debug, Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new audit log repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for PgAuditLogRepository {
    #[instrument(skip(self, entry), fields(shop = %shop, action = %entry.action))]
    async fn append(
        &self,
        shop: &ShopDomain,
        entry: NewAuditLog,
    ) -> Result<AuditLog, RepositoryError> {
        let row = sqlx::query_as::<_, AuditLogRow>(
            r#"
            INSERT INTO logs (shop, action, description, "type")
            VALUES ($1, $2, $3, $4)
            RETURNING id, shop, action, description, "type", occurred_at
            "#,
        )
        .bind(shop)
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(entry.log_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn list(
        &self,
        shop: &ShopDomain,
        take: i64,
        cursor: Option<LogId>,
    ) -> Result<Vec<AuditLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, shop, action, description, "type", occurred_at
            FROM logs
            WHERE shop = $1 AND ($2::INT IS NULL OR id > $2)
            ORDER BY id ASC
            LIMIT $3
            "#,
        )
        .bind(shop)
        .bind(cursor)
        .bind(take)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn recent(&self, shop: &ShopDomain, take: i64) -> Result<Vec<AuditLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, shop, action, description, "type", occurred_at
            FROM logs
            WHERE shop = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(shop)
        .bind(take)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn get(&self, id: LogId, shop: &ShopDomain) -> Result<Option<AuditLog>, RepositoryError> {
        let row = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, shop, action, description, "type", occurred_at
            FROM logs
            WHERE id = $1 AND shop = $2
            "#,
        )
        .bind(id)
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn delete(&self, id: LogId, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM logs WHERE id = $1 AND shop = $2")
            .bind(id)
            .bind(shop)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
