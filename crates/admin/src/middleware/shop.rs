//! Shop (tenant) extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use expiration_manager_core::ShopDomain;

use crate::state::AppState;

/// Header an embedding app may send to name the shop it is acting for.
pub const SHOP_HEADER: &str = "x-shopify-shop-domain";

/// Extractor for the shop every read and write is scoped to.
///
/// Resolves to the configured shop. If the request names a shop in
/// [`SHOP_HEADER`], it must be that same shop.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentShop(shop): CurrentShop) -> String {
///     shop.to_string()
/// }
/// ```
pub struct CurrentShop(pub ShopDomain);

/// Error returned when the request names a shop this instance does not serve.
#[derive(Debug)]
pub enum ShopRejection {
    /// Header value is not a `*.myshopify.com` domain.
    Invalid,
    /// Header names a different shop.
    Unknown,
}

impl IntoResponse for ShopRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid => (StatusCode::BAD_REQUEST, "Invalid shop domain").into_response(),
            Self::Unknown => (StatusCode::FORBIDDEN, "Unknown shop").into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentShop {
    type Rejection = ShopRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let configured = state.shop();

        let Some(header) = parts.headers.get(SHOP_HEADER) else {
            return Ok(Self(configured.clone()));
        };

        let requested = header
            .to_str()
            .ok()
            .and_then(|value| ShopDomain::parse(value).ok())
            .ok_or(ShopRejection::Invalid)?;

        if &requested == configured {
            Ok(Self(requested))
        } else {
            tracing::warn!(requested = %requested, "Request for a shop this instance does not serve");
            Err(ShopRejection::Unknown)
        }
    }
}
