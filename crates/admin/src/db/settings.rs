//! Settings repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use expiration_manager_core::ShopDomain;

use super::{RepositoryError, SettingsStore};
use crate::models::Settings;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    shop: ShopDomain,
    warning_period: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Self {
            shop: row.shop,
            warning_period: row.warning_period,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedSettingsRow {
    #[sqlx(flatten)]
    settings: SettingsRow,
    inserted: bool,
}

/// `PostgreSQL`-backed [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsRepository {
    #[instrument(skip(self), fields(shop = %shop))]
    async fn get(&self, shop: &ShopDomain) -> Result<Option<Settings>, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r"
            SELECT shop, warning_period, created_at, updated_at
            FROM settings
            WHERE shop = $1
            ",
        )
        .bind(shop)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn save(
        &self,
        shop: &ShopDomain,
        warning_period: i32,
    ) -> Result<(Settings, bool), RepositoryError> {
        // xmax is zero only for a freshly inserted tuple
        let row = sqlx::query_as::<_, SavedSettingsRow>(
            r"
            INSERT INTO settings (shop, warning_period)
            VALUES ($1, $2)
            ON CONFLICT (shop) DO UPDATE
                SET warning_period = EXCLUDED.warning_period, updated_at = NOW()
            RETURNING shop, warning_period, created_at, updated_at, (xmax = 0) AS inserted
            ",
        )
        .bind(shop)
        .bind(warning_period)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.settings.into(), row.inserted))
    }
}
