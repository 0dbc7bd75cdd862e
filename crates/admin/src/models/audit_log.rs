//! Audit log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use expiration_manager_core::{LogId, LogType, ShopDomain};

/// A recorded change made through the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Monotonic ID assigned on write.
    pub id: LogId,
    /// Shop the change belongs to.
    pub shop: ShopDomain,
    /// Dotted action tag, e.g. `product.expiration_date.update`.
    pub action: String,
    /// Human-readable summary.
    pub description: String,
    /// Outcome of the action.
    #[serde(rename = "type")]
    pub log_type: LogType,
    /// When the record was written.
    pub occurred_at: DateTime<Utc>,
}

/// Input for appending an audit log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLog {
    pub action: String,
    pub description: String,
    pub log_type: LogType,
}

impl NewAuditLog {
    /// A successful action.
    #[must_use]
    pub fn success(action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            description: description.into(),
            log_type: LogType::Success,
        }
    }
}
