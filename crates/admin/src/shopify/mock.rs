//! In-memory catalog for testing.
//!
//! Cursors are the stringified index of a product in the catalog, so paging
//! is stable as long as the product list is not reordered.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use expiration_manager_core::ExpirationField;

use super::{
    AdminShopifyError, CatalogApi, GraphQLError,
    types::{
        CatalogProduct, Metafield, MetafieldDefinition, MetafieldDefinitionInput, MetafieldInput,
        PageInfo, PageRequest, ProductConnection,
    },
};

/// Mock catalog for testing.
#[derive(Default)]
pub struct MockCatalog {
    products: RwLock<Vec<CatalogProduct>>,
    definitions: RwLock<Vec<MetafieldDefinition>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
    omit_end_cursor: RwLock<bool>,
    page_calls: AtomicUsize,
    metafield_writes: AtomicUsize,
    next_id: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<CatalogProduct>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Serve pages with `endCursor: null` even when more pages follow.
    pub async fn set_omit_end_cursor(&self, omit: bool) {
        *self.omit_end_cursor.write().await = omit;
    }

    /// Number of `products_page` calls served.
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Number of metafield create/update calls served.
    pub fn metafield_writes(&self) -> usize {
        self.metafield_writes.load(Ordering::SeqCst)
    }

    pub async fn definitions(&self) -> Vec<MetafieldDefinition> {
        self.definitions.read().await.clone()
    }

    pub async fn stored_product(&self, id: &str) -> Option<CatalogProduct> {
        self.products.read().await.iter().find(|p| p.id == id).cloned()
    }

    fn next_gid(&self, kind: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("gid://shopify/{kind}/{n}")
    }

    async fn check_read(&self) -> Result<(), AdminShopifyError> {
        if *self.fail_on_read.read().await {
            return Err(AdminShopifyError::GraphQL(vec![GraphQLError::message(
                "Mock read failure",
            )]));
        }
        Ok(())
    }

    async fn check_write(&self) -> Result<(), AdminShopifyError> {
        if *self.fail_on_write.read().await {
            return Err(AdminShopifyError::UserError(
                "Mock write failure".to_string(),
            ));
        }
        Ok(())
    }
}

/// A bare product with numeric id `n`.
#[must_use]
pub fn product(n: u64) -> CatalogProduct {
    CatalogProduct {
        id: format!("gid://shopify/Product/{n}"),
        title: format!("Product {n}"),
        handle: format!("product-{n}"),
        status: "ACTIVE".to_string(),
        tags: vec![],
        total_inventory: Some(0),
        image_url: None,
        metafields: vec![],
        variants: vec![],
        cursor: None,
    }
}

/// `product` with app metafields set to the given raw values.
#[must_use]
pub fn product_with(n: u64, values: &[(ExpirationField, &str)]) -> CatalogProduct {
    let mut p = product(n);
    p.metafields = values
        .iter()
        .map(|(field, value)| Metafield {
            id: format!("gid://shopify/Metafield/{n}-{}", field.key()),
            namespace: field.namespace().to_string(),
            key: field.key().to_string(),
            value_type: field.value_type().as_str().to_string(),
            value: (*value).to_string(),
        })
        .collect();
    p
}

fn parse_cursor(cursor: Option<&String>) -> Option<usize> {
    cursor.and_then(|c| c.parse().ok())
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn products_page(
        &self,
        request: &PageRequest,
    ) -> Result<ProductConnection, AdminShopifyError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read().await?;

        let products = self.products.read().await;
        let len = products.len();
        let size = usize::try_from(request.size().max(0)).unwrap_or(0);

        let (start, end) = match request {
            PageRequest::Forward { after, .. } => {
                let start = parse_cursor(after.as_ref()).map_or(0, |i| i + 1).min(len);
                (start, (start + size).min(len))
            }
            PageRequest::Backward { before, .. } => {
                let end = parse_cursor(before.as_ref()).unwrap_or(len).min(len);
                (end.saturating_sub(size), end)
            }
        };

        let page: Vec<CatalogProduct> = products
            .iter()
            .enumerate()
            .skip(start)
            .take(end - start)
            .map(|(i, p)| CatalogProduct {
                cursor: Some(i.to_string()),
                ..p.clone()
            })
            .collect();

        let page_info = PageInfo {
            has_next_page: end < len,
            has_previous_page: start > 0,
            start_cursor: page.first().and_then(|p| p.cursor.clone()),
            end_cursor: if *self.omit_end_cursor.read().await {
                None
            } else {
                page.last().and_then(|p| p.cursor.clone())
            },
        };

        Ok(ProductConnection {
            products: page,
            page_info,
        })
    }

    async fn product(&self, id: &str) -> Result<Option<CatalogProduct>, AdminShopifyError> {
        self.check_read().await?;
        Ok(self.stored_product(id).await)
    }

    async fn product_metafield(
        &self,
        product_id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<Metafield>, AdminShopifyError> {
        self.check_read().await?;
        let product = self
            .stored_product(product_id)
            .await
            .ok_or_else(|| AdminShopifyError::NotFound(product_id.to_string()))?;
        Ok(product
            .metafields
            .into_iter()
            .find(|m| m.namespace == namespace && m.key == key))
    }

    async fn create_metafield(
        &self,
        product_id: &str,
        input: &MetafieldInput,
    ) -> Result<Metafield, AdminShopifyError> {
        self.check_write().await?;
        self.metafield_writes.fetch_add(1, Ordering::SeqCst);

        let metafield = Metafield {
            id: self.next_gid("Metafield"),
            namespace: input.namespace.clone(),
            key: input.key.clone(),
            value_type: input.value_type.as_str().to_string(),
            value: input.value.clone(),
        };

        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AdminShopifyError::NotFound(product_id.to_string()))?;
        product.metafields.push(metafield.clone());
        Ok(metafield)
    }

    async fn update_metafield(
        &self,
        product_id: &str,
        existing: &Metafield,
        value: &str,
    ) -> Result<Metafield, AdminShopifyError> {
        self.check_write().await?;
        self.metafield_writes.fetch_add(1, Ordering::SeqCst);

        let mut products = self.products.write().await;
        let metafield = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .and_then(|p| p.metafields.iter_mut().find(|m| m.id == existing.id))
            .ok_or_else(|| AdminShopifyError::NotFound(existing.id.clone()))?;
        metafield.value = value.to_string();
        Ok(metafield.clone())
    }

    async fn metafield_definition(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<MetafieldDefinition>, AdminShopifyError> {
        self.check_read().await?;
        Ok(self
            .definitions
            .read()
            .await
            .iter()
            .find(|d| d.namespace == namespace && d.key == key)
            .cloned())
    }

    async fn create_metafield_definition(
        &self,
        input: &MetafieldDefinitionInput,
    ) -> Result<MetafieldDefinition, AdminShopifyError> {
        self.check_write().await?;
        let definition = MetafieldDefinition {
            id: self.next_gid("MetafieldDefinition"),
            name: input.name.clone(),
            namespace: input.namespace.clone(),
            key: input.key.clone(),
            value_type: input.value_type.as_str().to_string(),
        };
        self.definitions.write().await.push(definition.clone());
        Ok(definition)
    }
}
