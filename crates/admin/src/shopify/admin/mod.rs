//! Shopify Admin API GraphQL client.
//!
//! Authenticates with a static Admin API access token.

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::ShopifyAdminConfig;

use super::{
    AdminShopifyError, CatalogApi, GraphQLError, GraphQLErrorLocation,
    types::{
        CatalogProduct, Metafield, MetafieldDefinition, MetafieldDefinitionInput, MetafieldInput,
        PageRequest, ProductConnection,
    },
};

mod conversions;
pub mod queries;

use conversions::{
    convert_definition, convert_metafield, convert_product, convert_product_connection,
    format_user_errors,
};
use queries::{
    GetMetafieldDefinition, GetProduct, GetProductMetafield, GetProducts,
    MetafieldDefinitionCreate, ProductUpdateMetafields, get_metafield_definition, get_product,
    get_product_metafield, get_products, metafield_definition_create, product_update_metafields,
};

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    store: String,
    api_version: String,
    access_token: SecretString,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify Admin API configuration
    #[must_use]
    pub fn new(config: &ShopifyAdminConfig) -> Self {
        let client = reqwest::Client::new();

        Self {
            inner: Arc::new(AdminClientInner {
                client,
                store: config.store.as_str().to_string(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        }
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.inner.store, self.inner.api_version
        )
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(self.endpoint())
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let graphql_response: GraphQLResponse<Q::ResponseData> = response.json().await?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response
            .data
            .ok_or_else(|| AdminShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    /// Run `productUpdate` with a single metafield input and return the
    /// metafield as stored afterwards.
    async fn write_product_metafield(
        &self,
        product_id: &str,
        namespace: &str,
        key: &str,
        input: product_update_metafields::MetafieldInput,
    ) -> Result<Metafield, AdminShopifyError> {
        let variables = product_update_metafields::Variables {
            product: product_update_metafields::ProductUpdateInput {
                id: product_id.to_string(),
                metafields: vec![input],
            },
            namespace: namespace.to_string(),
            key: key.to_string(),
        };

        let response = self.execute::<ProductUpdateMetafields>(variables).await?;

        let payload = response.product_update.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError::message("No productUpdate payload")])
        })?;

        if !payload.user_errors.is_empty() {
            return Err(AdminShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .product
            .and_then(|p| p.metafield)
            .map(convert_metafield)
            .ok_or_else(|| AdminShopifyError::NotFound(format!("metafield {namespace}.{key}")))
    }
}

#[async_trait]
impl CatalogApi for AdminClient {
    #[instrument(skip(self), fields(size = request.size()))]
    async fn products_page(
        &self,
        request: &PageRequest,
    ) -> Result<ProductConnection, AdminShopifyError> {
        let variables = match request {
            PageRequest::Forward { first, after } => get_products::Variables {
                first: Some(*first),
                after: after.clone(),
                last: None,
                before: None,
            },
            PageRequest::Backward { last, before } => get_products::Variables {
                first: None,
                after: None,
                last: Some(*last),
                before: before.clone(),
            },
        };

        let response = self.execute::<GetProducts>(variables).await?;
        Ok(convert_product_connection(response.products))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: &str) -> Result<Option<CatalogProduct>, AdminShopifyError> {
        let variables = get_product::Variables { id: id.to_string() };
        let response = self.execute::<GetProduct>(variables).await?;
        Ok(response.product.map(|p| convert_product(p, None)))
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn product_metafield(
        &self,
        product_id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<Metafield>, AdminShopifyError> {
        let variables = get_product_metafield::Variables {
            id: product_id.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        let response = self.execute::<GetProductMetafield>(variables).await?;
        let product = response
            .product
            .ok_or_else(|| AdminShopifyError::NotFound(product_id.to_string()))?;
        Ok(product.metafield.map(convert_metafield))
    }

    #[instrument(skip(self, input), fields(product_id = %product_id, key = %input.key))]
    async fn create_metafield(
        &self,
        product_id: &str,
        input: &MetafieldInput,
    ) -> Result<Metafield, AdminShopifyError> {
        self.write_product_metafield(
            product_id,
            &input.namespace,
            &input.key,
            product_update_metafields::MetafieldInput {
                id: None,
                namespace: Some(input.namespace.clone()),
                key: Some(input.key.clone()),
                type_: Some(input.value_type.as_str().to_string()),
                value: input.value.clone(),
            },
        )
        .await
    }

    #[instrument(skip(self, existing), fields(product_id = %product_id, metafield_id = %existing.id))]
    async fn update_metafield(
        &self,
        product_id: &str,
        existing: &Metafield,
        value: &str,
    ) -> Result<Metafield, AdminShopifyError> {
        self.write_product_metafield(
            product_id,
            &existing.namespace,
            &existing.key,
            product_update_metafields::MetafieldInput {
                id: Some(existing.id.clone()),
                namespace: None,
                key: None,
                type_: None,
                value: value.to_string(),
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn metafield_definition(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<MetafieldDefinition>, AdminShopifyError> {
        let variables = get_metafield_definition::Variables {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        let response = self.execute::<GetMetafieldDefinition>(variables).await?;
        Ok(response
            .metafield_definitions
            .edges
            .into_iter()
            .next()
            .map(|e| convert_definition(e.node)))
    }

    #[instrument(skip(self, input), fields(key = %input.key))]
    async fn create_metafield_definition(
        &self,
        input: &MetafieldDefinitionInput,
    ) -> Result<MetafieldDefinition, AdminShopifyError> {
        let variables = metafield_definition_create::Variables {
            definition: metafield_definition_create::MetafieldDefinitionInput {
                name: input.name.clone(),
                namespace: input.namespace.clone(),
                key: input.key.clone(),
                description: input.description.clone(),
                type_: input.value_type.as_str().to_string(),
                owner_type: "PRODUCT".to_string(),
            },
        };

        let response = self.execute::<MetafieldDefinitionCreate>(variables).await?;

        let payload = response.metafield_definition_create.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError::message(
                "No metafieldDefinitionCreate payload",
            )])
        })?;

        if !payload.user_errors.is_empty() {
            return Err(AdminShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .created_definition
            .map(convert_definition)
            .ok_or_else(|| AdminShopifyError::NotFound(format!("definition {}", input.key)))
    }
}
