//! Conversions from GraphQL response shapes to domain types.

use super::queries::{
    DefinitionNode, MetafieldNode, ProductNode, UserError, get_products,
};
use crate::shopify::types::{
    CatalogProduct, Metafield, MetafieldDefinition, PageInfo, ProductConnection, ProductVariant,
};

pub fn convert_metafield(node: MetafieldNode) -> Metafield {
    Metafield {
        id: node.id,
        namespace: node.namespace,
        key: node.key,
        value_type: node.type_,
        value: node.value,
    }
}

pub fn convert_definition(node: DefinitionNode) -> MetafieldDefinition {
    MetafieldDefinition {
        id: node.id,
        name: node.name,
        namespace: node.namespace,
        key: node.key,
        value_type: node.type_.name,
    }
}

pub fn convert_product(node: ProductNode, cursor: Option<String>) -> CatalogProduct {
    let image_url = node
        .featured_media
        .and_then(|m| m.preview)
        .and_then(|p| p.image)
        .map(|i| i.url);

    CatalogProduct {
        id: node.id,
        title: node.title,
        handle: node.handle,
        status: node.status,
        tags: node.tags,
        total_inventory: node.total_inventory,
        image_url,
        metafields: node
            .metafields
            .edges
            .into_iter()
            .map(|e| convert_metafield(e.node))
            .collect(),
        variants: node
            .variants
            .edges
            .into_iter()
            .map(|e| ProductVariant {
                id: e.node.id,
                price: e.node.price,
                barcode: e.node.barcode,
                created_at: e.node.created_at,
            })
            .collect(),
        cursor,
    }
}

pub fn convert_product_connection(conn: get_products::ProductConnection) -> ProductConnection {
    ProductConnection {
        products: conn
            .edges
            .into_iter()
            .map(|e| convert_product(e.node, Some(e.cursor)))
            .collect(),
        page_info: PageInfo {
            has_next_page: conn.page_info.has_next_page,
            has_previous_page: conn.page_info.has_previous_page,
            start_cursor: conn.page_info.start_cursor,
            end_cursor: conn.page_info.end_cursor,
        },
    }
}

/// Join mutation user errors as `field: message`.
pub fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_user_errors() {
        let errors = vec![
            UserError {
                field: Some(vec!["metafields".to_string(), "0".to_string(), "value".to_string()]),
                message: "is invalid".to_string(),
            },
            UserError {
                field: None,
                message: "Product does not exist".to_string(),
            },
        ];
        assert_eq!(
            format_user_errors(&errors),
            "metafields.0.value: is invalid; Product does not exist"
        );
    }
}
