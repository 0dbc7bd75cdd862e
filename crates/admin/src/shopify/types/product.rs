//! Product types.

use serde::{Deserialize, Serialize};

use expiration_manager_core::ExpirationField;

use super::{Metafield, PageInfo};

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// A product variant (price and barcode only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    /// Decimal price as string.
    pub price: String,
    pub barcode: Option<String>,
    pub created_at: Option<String>,
}

/// A catalog product with the metafields this app manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Product GID.
    pub id: String,
    pub title: String,
    pub handle: String,
    /// `ACTIVE`, `DRAFT` or `ARCHIVED`.
    pub status: String,
    pub tags: Vec<String>,
    pub total_inventory: Option<i64>,
    /// Featured media preview URL.
    pub image_url: Option<String>,
    /// Metafields in the app namespace.
    pub metafields: Vec<Metafield>,
    pub variants: Vec<ProductVariant>,
    /// Connection cursor, when read from a list.
    pub cursor: Option<String>,
}

impl CatalogProduct {
    /// The stored metafield for `field`, if any.
    #[must_use]
    pub fn metafield(&self, field: ExpirationField) -> Option<&Metafield> {
        self.metafields
            .iter()
            .find(|m| m.namespace == field.namespace() && m.key == field.key())
    }

    /// Raw value of the stored metafield for `field`.
    #[must_use]
    pub fn metafield_value(&self, field: ExpirationField) -> Option<&str> {
        self.metafield(field).map(|m| m.value.as_str())
    }
}

/// One page of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    pub products: Vec<CatalogProduct>,
    pub page_info: PageInfo,
}

/// Normalize a path parameter to a product GID.
///
/// Accepts a bare numeric id (`123`) or a full GID
/// (`gid://shopify/Product/123`). Returns `None` for anything else.
#[must_use]
pub fn product_gid(id: &str) -> Option<String> {
    let id = id.trim();
    let numeric = id.strip_prefix(PRODUCT_GID_PREFIX).unwrap_or(id);
    if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{PRODUCT_GID_PREFIX}{numeric}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn metafield(key: &str, value: &str) -> Metafield {
        Metafield {
            id: format!("gid://shopify/Metafield/{key}"),
            namespace: "expiration_manager".to_string(),
            key: key.to_string(),
            value_type: "date".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_product_gid() {
        assert_eq!(
            product_gid("123").as_deref(),
            Some("gid://shopify/Product/123")
        );
        assert_eq!(
            product_gid("gid://shopify/Product/123").as_deref(),
            Some("gid://shopify/Product/123")
        );
        assert_eq!(product_gid(""), None);
        assert_eq!(product_gid("gid://shopify/Order/123"), None);
        assert_eq!(product_gid("12a"), None);
    }

    #[test]
    fn test_metafield_lookup() {
        let product = CatalogProduct {
            id: "gid://shopify/Product/1".to_string(),
            title: "Milk".to_string(),
            handle: "milk".to_string(),
            status: "ACTIVE".to_string(),
            tags: vec![],
            total_inventory: Some(3),
            image_url: None,
            metafields: vec![metafield("expiration_date", "2026-06-01")],
            variants: vec![],
            cursor: None,
        };

        assert_eq!(
            product.metafield_value(ExpirationField::ExpirationDate),
            Some("2026-06-01")
        );
        assert!(product.metafield(ExpirationField::WarningDate).is_none());
    }
}
