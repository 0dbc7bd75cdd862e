//! Status enums for audit records and product filtering.

use serde::{Deserialize, Serialize};

/// Outcome tag stored with every audit log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "log_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    #[default]
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!("invalid log type: {s}")),
        }
    }
}

/// Category filter for the full product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductFilter {
    /// Every product, in upstream order.
    #[default]
    All,
    /// Expiration tracking switched on.
    Active,
    /// Expiration tracking switched off or never set.
    Inactive,
    /// Past the expiration date.
    Expired,
    /// Between the warning date and the expiration date.
    Expiring,
}

impl std::fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Expired => write!(f, "expired"),
            Self::Expiring => write!(f, "expiring"),
        }
    }
}

impl std::str::FromStr for ProductFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            "expiring" => Ok(Self::Expiring),
            _ => Err(format!("invalid product filter: {s}")),
        }
    }
}
