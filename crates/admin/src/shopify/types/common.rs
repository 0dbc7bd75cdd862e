//! Metafield and pagination types shared across resources.

use serde::{Deserialize, Serialize};

use expiration_manager_core::MetafieldType;

// =============================================================================
// Metafield Types
// =============================================================================

/// A metafield for storing custom data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metafield {
    /// Metafield ID.
    pub id: String,
    /// Namespace for grouping metafields.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Shopify type name (e.g., `date`, `boolean`).
    #[serde(rename = "type")]
    pub value_type: String,
    /// The metafield value.
    pub value: String,
}

/// Input for creating a metafield on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldInput {
    /// Namespace for the metafield.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// The metafield type.
    pub value_type: MetafieldType,
    /// The value to store.
    pub value: String,
}

/// A metafield definition (schema entry shown in the Shopify admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinition {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub key: String,
    /// Shopify type name.
    #[serde(rename = "type")]
    pub value_type: String,
}

/// Input for creating a product metafield definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldDefinitionInput {
    pub name: String,
    pub namespace: String,
    pub key: String,
    pub description: String,
    pub value_type: MetafieldType,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<String>,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// Which page of a connection to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// `first` items after the `after` cursor.
    Forward {
        first: i64,
        after: Option<String>,
    },
    /// `last` items before the `before` cursor.
    Backward {
        last: i64,
        before: Option<String>,
    },
}

impl PageRequest {
    /// First page of `first` items.
    #[must_use]
    pub const fn first(first: i64) -> Self {
        Self::Forward { first, after: None }
    }

    /// Page size requested.
    #[must_use]
    pub const fn size(&self) -> i64 {
        match self {
            Self::Forward { first, .. } => *first,
            Self::Backward { last, .. } => *last,
        }
    }
}
