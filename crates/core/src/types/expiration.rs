//! Expiration metafields and status evaluation.
//!
//! A tracked product carries up to three metafields in the
//! [`NAMESPACE`] namespace. The `expired` / `expiring_soon` flags are never
//! stored: they are derived from those values and an injected "now" every
//! time a product is read.

use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Metafield namespace owned by this app.
pub const NAMESPACE: &str = "expiration_manager";

/// Warning period applied when a shop has not saved one.
pub const DEFAULT_WARNING_PERIOD_DAYS: i32 = 7;

/// Format of `date` metafield values.
const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Metafield descriptors
// =============================================================================

/// Shopify metafield value types used by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetafieldType {
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Date and time. Only found on values written by older installs.
    DateTime,
    /// `"true"` / `"false"`.
    Boolean,
}

impl MetafieldType {
    /// Shopify type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for MetafieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of product metafields managed by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationField {
    /// Date after which the product is expired.
    ExpirationDate,
    /// Date after which the product is "expiring soon".
    WarningDate,
    /// Whether expiration tracking is switched on for the product.
    Status,
}

impl ExpirationField {
    /// All managed fields, in bootstrap order.
    pub const ALL: [Self; 3] = [Self::ExpirationDate, Self::WarningDate, Self::Status];

    /// Metafield namespace.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        NAMESPACE
    }

    /// Metafield key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ExpirationDate => "expiration_date",
            Self::WarningDate => "expiration_warning_date",
            Self::Status => "expiration_status",
        }
    }

    /// Type used when creating the metafield and its definition.
    #[must_use]
    pub const fn value_type(self) -> MetafieldType {
        match self {
            Self::ExpirationDate | Self::WarningDate => MetafieldType::Date,
            Self::Status => MetafieldType::Boolean,
        }
    }

    /// Human-readable definition name shown in the Shopify admin.
    #[must_use]
    pub const fn definition_name(self) -> &'static str {
        match self {
            Self::ExpirationDate => "Expiration Date",
            Self::WarningDate => "Alert Date",
            Self::Status => "Expiration Status",
        }
    }

    /// Definition description shown in the Shopify admin.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ExpirationDate => "The expiration date for the product",
            Self::WarningDate => "Alert users about an item nearing its expiration",
            Self::Status => "The status of the expiration date for the product",
        }
    }

    /// Look up a field by metafield key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Audit action tag for an upsert, e.g. `product.expiration_date.add`.
    #[must_use]
    pub fn audit_action(self, created: bool) -> String {
        let verb = if created { "add" } else { "update" };
        format!("product.{}.{verb}", self.key())
    }

    /// Audit description for an upsert.
    #[must_use]
    pub fn audit_description(self, created: bool, value: &FieldValue) -> String {
        match (self, created) {
            (Self::ExpirationDate, true) => format!("Add product expiration date - {value}"),
            (Self::ExpirationDate, false) => format!("Update product expiration date to {value}"),
            (Self::WarningDate, true) => format!("Add product expiration alert date - {value}"),
            (Self::WarningDate, false) => {
                format!("Update product expiration alert date to {value}")
            }
            (Self::Status, true) => format!("Add product expiration status set to {value}"),
            (Self::Status, false) => format!("Update product expiration status set to {value}"),
        }
    }
}

// =============================================================================
// Field values
// =============================================================================

/// Errors that can occur when parsing a [`FieldValue`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldValueError {
    /// The value is not a `YYYY-MM-DD` date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    /// The value is not `true` or `false`.
    #[error("invalid flag '{0}', expected true or false")]
    InvalidFlag(String),
    /// The value does not match the field's metafield type.
    #[error("{field} expects a {expected} value")]
    TypeMismatch {
        /// Metafield key.
        field: &'static str,
        /// Expected metafield type.
        expected: MetafieldType,
    },
}

/// A typed value for one of the managed metafields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Value for a `date` field.
    Date(NaiveDate),
    /// Value for a `boolean` field.
    Flag(bool),
}

impl FieldValue {
    /// Parse a raw form value for the given field.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid date (date fields) or
    /// not `true`/`false` (status field).
    pub fn parse_for(field: ExpirationField, raw: &str) -> Result<Self, FieldValueError> {
        let raw = raw.trim();
        match field.value_type() {
            MetafieldType::Date | MetafieldType::DateTime => {
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map(Self::Date)
                    .map_err(|_| FieldValueError::InvalidDate(raw.to_string()))
            }
            MetafieldType::Boolean => match raw {
                "true" => Ok(Self::Flag(true)),
                "false" => Ok(Self::Flag(false)),
                _ => Err(FieldValueError::InvalidFlag(raw.to_string())),
            },
        }
    }

    /// The metafield type this value serializes to.
    #[must_use]
    pub const fn value_type(&self) -> MetafieldType {
        match self {
            Self::Date(_) => MetafieldType::Date,
            Self::Flag(_) => MetafieldType::Boolean,
        }
    }

    /// Check that this value can be written to `field`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldValueError::TypeMismatch`] if the types differ.
    pub fn check_for(&self, field: ExpirationField) -> Result<(), FieldValueError> {
        if self.value_type() == field.value_type() {
            Ok(())
        } else {
            Err(FieldValueError::TypeMismatch {
                field: field.key(),
                expected: field.value_type(),
            })
        }
    }

    /// String stored in the metafield.
    #[must_use]
    pub fn to_metafield_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Derived expiration flags for a product at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationState {
    /// `now` is strictly after the expiration date.
    pub expired: bool,
    /// `now` is strictly between the warning date and the expiration date.
    pub expiring_soon: bool,
}

/// Compute the derived flags.
///
/// `expired` ignores the warning date. `expiring_soon` holds on the open
/// interval `(warning, expiration)` only, so it is always false when the
/// warning date is not before the expiration date.
#[must_use]
pub fn evaluate(
    now: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
    warning: Option<DateTime<Utc>>,
) -> ExpirationState {
    let expired = expiration.is_some_and(|exp| now > exp);
    let expiring_soon = match (warning, expiration) {
        (Some(warn), Some(exp)) => now > warn && now < exp,
        _ => false,
    };

    ExpirationState {
        expired,
        expiring_soon,
    }
}

/// Parse a stored date metafield value into the instant it is compared as.
///
/// `YYYY-MM-DD` values become midnight UTC. RFC 3339 and naive
/// `YYYY-MM-DDTHH:MM:SS` values (legacy `date_time` fields) keep their time.
/// Anything else is `None`, which never yields an expired or expiring state.
#[must_use]
pub fn parse_attribute_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Interpret a stored status metafield. Only the exact string `"true"` is on.
#[must_use]
pub fn parse_status_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Warning date `days` before `expiration`.
///
/// Returns `None` if the result would overflow the calendar.
#[must_use]
pub fn default_warning_date(expiration: NaiveDate, days: i32) -> Option<NaiveDate> {
    TimeDelta::try_days(i64::from(days)).and_then(|delta| expiration.checked_sub_signed(delta))
}

/// Inclusive range of calendar days on which a product shows as expiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertWindow {
    /// First alerting day.
    pub from: NaiveDate,
    /// Last alerting day (the day before expiration).
    pub to: NaiveDate,
}

/// Alert window for a warning/expiration pair, or `None` if it is empty.
#[must_use]
pub fn alert_window(warning: NaiveDate, expiration: NaiveDate) -> Option<AlertWindow> {
    let to = expiration.pred_opt()?;
    (warning <= to).then_some(AlertWindow { from: warning, to })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    // -------------------------------------------------------------------------
    // evaluate
    // -------------------------------------------------------------------------

    #[test]
    fn test_expired_requires_expiration_date() {
        let now = midnight(2026, 6, 1);
        assert!(!evaluate(now, None, None).expired);
        assert!(!evaluate(now, None, Some(midnight(2026, 1, 1))).expired);
    }

    #[test]
    fn test_expired_is_strictly_after() {
        let exp = midnight(2026, 6, 1);
        assert!(!evaluate(exp, Some(exp), None).expired);
        assert!(evaluate(exp + TimeDelta::seconds(1), Some(exp), None).expired);
        assert!(!evaluate(exp - TimeDelta::seconds(1), Some(exp), None).expired);
    }

    #[test]
    fn test_expired_ignores_warning_date() {
        let exp = midnight(2026, 6, 1);
        let now = midnight(2026, 6, 2);
        for warn in [None, Some(midnight(2026, 5, 1)), Some(midnight(2026, 7, 1))] {
            assert!(evaluate(now, Some(exp), warn).expired);
        }
    }

    #[test]
    fn test_expiring_soon_open_interval() {
        let warn = midnight(2026, 5, 25);
        let exp = midnight(2026, 6, 1);

        assert!(!evaluate(warn - TimeDelta::days(1), Some(exp), Some(warn)).expiring_soon);
        assert!(!evaluate(warn, Some(exp), Some(warn)).expiring_soon);
        assert!(evaluate(warn + TimeDelta::seconds(1), Some(exp), Some(warn)).expiring_soon);
        assert!(evaluate(midnight(2026, 5, 28), Some(exp), Some(warn)).expiring_soon);
        assert!(!evaluate(exp, Some(exp), Some(warn)).expiring_soon);
        assert!(!evaluate(exp + TimeDelta::days(3), Some(exp), Some(warn)).expiring_soon);
    }

    #[test]
    fn test_expiring_soon_requires_both_dates() {
        let now = midnight(2026, 5, 28);
        assert!(!evaluate(now, None, Some(midnight(2026, 5, 25))).expiring_soon);
        assert!(!evaluate(now, Some(midnight(2026, 6, 1)), None).expiring_soon);
    }

    #[test]
    fn test_expired_and_expiring_are_exclusive() {
        let warn = midnight(2026, 5, 25);
        let exp = midnight(2026, 6, 1);
        let mut now = midnight(2026, 5, 20);
        while now < midnight(2026, 6, 10) {
            let state = evaluate(now, Some(exp), Some(warn));
            assert!(!(state.expired && state.expiring_soon));
            now += TimeDelta::hours(6);
        }
    }

    #[test]
    fn test_inverted_dates_never_expiring() {
        let exp = midnight(2026, 6, 1);
        let warn = midnight(2026, 6, 5);
        let state = evaluate(midnight(2026, 6, 3), Some(exp), Some(warn));
        assert!(state.expired);
        assert!(!state.expiring_soon);
    }

    // -------------------------------------------------------------------------
    // parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_attribute_instant_date() {
        assert_eq!(
            parse_attribute_instant("2026-06-01"),
            Some(midnight(2026, 6, 1))
        );
    }

    #[test]
    fn test_parse_attribute_instant_legacy_date_time() {
        assert_eq!(
            parse_attribute_instant("2026-06-01T12:30:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_attribute_instant("2026-06-01T12:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_attribute_instant("2026-06-01T12:30:00"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_attribute_instant_malformed_is_none() {
        assert_eq!(parse_attribute_instant(""), None);
        assert_eq!(parse_attribute_instant("not a date"), None);
        assert_eq!(parse_attribute_instant("2026-13-01"), None);
    }

    #[test]
    fn test_parse_status_flag() {
        assert!(parse_status_flag(Some("true")));
        assert!(!parse_status_flag(Some("false")));
        assert!(!parse_status_flag(Some("TRUE")));
        assert!(!parse_status_flag(None));
    }

    #[test]
    fn test_field_value_parse_for() {
        assert_eq!(
            FieldValue::parse_for(ExpirationField::ExpirationDate, "2026-06-01"),
            Ok(FieldValue::Date(day(2026, 6, 1)))
        );
        assert_eq!(
            FieldValue::parse_for(ExpirationField::Status, "true"),
            Ok(FieldValue::Flag(true))
        );
        assert!(matches!(
            FieldValue::parse_for(ExpirationField::WarningDate, "06/01/2026"),
            Err(FieldValueError::InvalidDate(_))
        ));
        assert!(matches!(
            FieldValue::parse_for(ExpirationField::Status, "yes"),
            Err(FieldValueError::InvalidFlag(_))
        ));
    }

    #[test]
    fn test_field_value_check_for() {
        let date = FieldValue::Date(day(2026, 6, 1));
        assert!(date.check_for(ExpirationField::ExpirationDate).is_ok());
        assert!(matches!(
            date.check_for(ExpirationField::Status),
            Err(FieldValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_field_value_metafield_strings() {
        assert_eq!(
            FieldValue::Date(day(2026, 1, 9)).to_metafield_value(),
            "2026-01-09"
        );
        assert_eq!(FieldValue::Flag(false).to_metafield_value(), "false");
    }

    // -------------------------------------------------------------------------
    // descriptors
    // -------------------------------------------------------------------------

    #[test]
    fn test_field_descriptors() {
        assert_eq!(ExpirationField::ExpirationDate.key(), "expiration_date");
        assert_eq!(ExpirationField::WarningDate.key(), "expiration_warning_date");
        assert_eq!(ExpirationField::Status.key(), "expiration_status");
        for field in ExpirationField::ALL {
            assert_eq!(field.namespace(), "expiration_manager");
            assert_eq!(ExpirationField::from_key(field.key()), Some(field));
        }
        assert_eq!(ExpirationField::Status.value_type().as_str(), "boolean");
        assert_eq!(ExpirationField::WarningDate.value_type().as_str(), "date");
    }

    #[test]
    fn test_audit_action_tags() {
        assert_eq!(
            ExpirationField::ExpirationDate.audit_action(true),
            "product.expiration_date.add"
        );
        assert_eq!(
            ExpirationField::WarningDate.audit_action(false),
            "product.expiration_warning_date.update"
        );
    }

    #[test]
    fn test_audit_descriptions() {
        let value = FieldValue::Date(day(2026, 6, 1));
        assert_eq!(
            ExpirationField::ExpirationDate.audit_description(false, &value),
            "Update product expiration date to 2026-06-01"
        );
        assert_eq!(
            ExpirationField::Status.audit_description(true, &FieldValue::Flag(true)),
            "Add product expiration status set to true"
        );
    }

    // -------------------------------------------------------------------------
    // helpers
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_warning_date() {
        assert_eq!(
            default_warning_date(day(2026, 3, 5), 7),
            Some(day(2026, 2, 26))
        );
        assert_eq!(
            default_warning_date(day(2026, 3, 5), 30),
            Some(day(2026, 2, 3))
        );
    }

    #[test]
    fn test_alert_window() {
        assert_eq!(
            alert_window(day(2026, 5, 25), day(2026, 6, 1)),
            Some(AlertWindow {
                from: day(2026, 5, 25),
                to: day(2026, 5, 31),
            })
        );
        assert_eq!(alert_window(day(2026, 6, 1), day(2026, 6, 1)), None);
    }
}
