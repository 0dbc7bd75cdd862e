//! Per-shop settings models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use expiration_manager_core::{DEFAULT_WARNING_PERIOD_DAYS, ShopDomain};

/// Stored settings row for a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub shop: ShopDomain,
    /// Days before expiration that a product starts showing as expiring.
    pub warning_period: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Settings as returned to clients, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub shop: ShopDomain,
    pub warning_period: i32,
    /// False when nothing has been saved and the default is in effect.
    pub saved: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SettingsView {
    /// Apply the default warning period when `settings` is absent.
    #[must_use]
    pub fn resolve(shop: &ShopDomain, settings: Option<Settings>) -> Self {
        match settings {
            Some(s) => Self {
                shop: s.shop,
                warning_period: s.warning_period,
                saved: true,
                updated_at: Some(s.updated_at),
            },
            None => Self {
                shop: shop.clone(),
                warning_period: DEFAULT_WARNING_PERIOD_DAYS,
                saved: false,
                updated_at: None,
            },
        }
    }
}
