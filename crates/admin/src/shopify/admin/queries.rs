//! GraphQL operation definitions for Shopify Admin API.
//!
//! Each operation implements `graphql_client::GraphQLQuery` over a document in
//! `graphql/admin/queries/`. Modules follow the `graphql_client` codegen
//! layout (`Variables` and `ResponseData` per operation) so the client's
//! generic `execute` works unchanged.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

const PRODUCTS_DOCUMENT: &str = include_str!("../../../graphql/admin/queries/products.graphql");
const METAFIELD_DEFINITIONS_DOCUMENT: &str =
    include_str!("../../../graphql/admin/queries/metafield_definitions.graphql");

// =============================================================================
// Shared response shapes
// =============================================================================

/// `{ edges { node } }` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldNode {
    pub id: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub price: String,
    pub barcode: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaPreview {
    pub image: Option<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedMedia {
    pub preview: Option<MediaPreview>,
}

/// Fields selected by the `ExpirationProduct` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub total_inventory: Option<i64>,
    pub featured_media: Option<FeaturedMedia>,
    pub metafields: Connection<MetafieldNode>,
    pub variants: Connection<VariantNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

// =============================================================================
// Product queries
// =============================================================================

pub struct GetProducts;

pub mod get_products {
    use super::{Deserialize, ProductNode, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: Option<i64>,
        pub after: Option<String>,
        pub last: Option<i64>,
        pub before: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: ProductConnection,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductConnection {
        pub edges: Vec<ProductEdge>,
        pub page_info: PageInfo,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductEdge {
        pub cursor: String,
        pub node: ProductNode,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageInfo {
        pub has_next_page: bool,
        pub has_previous_page: bool,
        pub start_cursor: Option<String>,
        pub end_cursor: Option<String>,
    }
}

impl GraphQLQuery for GetProducts {
    type Variables = get_products::Variables;
    type ResponseData = get_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "GetProducts",
        }
    }
}

pub struct GetProduct;

pub mod get_product {
    use super::{Deserialize, ProductNode, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductNode>,
    }
}

impl GraphQLQuery for GetProduct {
    type Variables = get_product::Variables;
    type ResponseData = get_product::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "GetProduct",
        }
    }
}

pub struct GetProductMetafield;

pub mod get_product_metafield {
    use super::{Deserialize, MetafieldNode, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub metafield: Option<MetafieldNode>,
    }
}

impl GraphQLQuery for GetProductMetafield {
    type Variables = get_product_metafield::Variables;
    type ResponseData = get_product_metafield::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "GetProductMetafield",
        }
    }
}

pub struct ProductUpdateMetafields;

pub mod product_update_metafields {
    use super::{Deserialize, MetafieldNode, Serialize, UserError};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub product: ProductUpdateInput,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ProductUpdateInput {
        pub id: String,
        pub metafields: Vec<MetafieldInput>,
    }

    /// Create input sets namespace/key/type; update input sets `id` only.
    #[derive(Debug, Clone, Serialize)]
    pub struct MetafieldInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub namespace: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub key: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub type_: Option<String>,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_update: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub product: Option<Product>,
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub metafield: Option<MetafieldNode>,
    }
}

impl GraphQLQuery for ProductUpdateMetafields {
    type Variables = product_update_metafields::Variables;
    type ResponseData = product_update_metafields::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: "ProductUpdateMetafields",
        }
    }
}

// =============================================================================
// Metafield definition queries
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionType {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionNode {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub type_: DefinitionType,
}

pub struct GetMetafieldDefinition;

pub mod get_metafield_definition {
    use super::{Connection, DefinitionNode, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafield_definitions: Connection<DefinitionNode>,
    }
}

impl GraphQLQuery for GetMetafieldDefinition {
    type Variables = get_metafield_definition::Variables;
    type ResponseData = get_metafield_definition::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: METAFIELD_DEFINITIONS_DOCUMENT,
            operation_name: "GetMetafieldDefinition",
        }
    }
}

pub struct MetafieldDefinitionCreate;

pub mod metafield_definition_create {
    use super::{DefinitionNode, Deserialize, Serialize, UserError};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub definition: MetafieldDefinitionInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldDefinitionInput {
        pub name: String,
        pub namespace: String,
        pub key: String,
        pub description: String,
        #[serde(rename = "type")]
        pub type_: String,
        pub owner_type: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafield_definition_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub created_definition: Option<DefinitionNode>,
        pub user_errors: Vec<UserError>,
    }
}

impl GraphQLQuery for MetafieldDefinitionCreate {
    type Variables = metafield_definition_create::Variables;
    type ResponseData = metafield_definition_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: METAFIELD_DEFINITIONS_DOCUMENT,
            operation_name: "MetafieldDefinitionCreate",
        }
    }
}
