//! Product route handlers.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use expiration_manager_core::{ExpirationField, FieldValue, ProductFilter};

use crate::config::MAX_PAGE_LIMIT;
use crate::error::AppError;
use crate::middleware::CurrentShop;
use crate::services::{
    OnFetchError, ProductDetail, ProductPage, SaveExpirationOutcome, TrackedProduct,
    UpsertOutcome,
};
use crate::shopify::{PageRequest, product_gid};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Query parameters for the paged product list.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub first: Option<i64>,
    pub after: Option<String>,
    pub last: Option<i64>,
    pub before: Option<String>,
}

impl PageQuery {
    /// Resolve to a single direction.
    ///
    /// Mixing `first`/`after` with `last`/`before` is rejected. With neither,
    /// the first page of [`DEFAULT_PAGE_SIZE`] is returned.
    fn into_request(self) -> Result<PageRequest, AppError> {
        let forward = self.first.is_some() || self.after.is_some();
        let backward = self.last.is_some() || self.before.is_some();

        let request = match (forward, backward) {
            (true, true) => {
                return Err(AppError::BadRequest(
                    "use either first/after or last/before, not both".to_string(),
                ));
            }
            (false, true) => PageRequest::Backward {
                last: self.last.unwrap_or(DEFAULT_PAGE_SIZE),
                before: self.before,
            },
            _ => PageRequest::Forward {
                first: self.first.unwrap_or(DEFAULT_PAGE_SIZE),
                after: self.after,
            },
        };

        let size = request.size();
        if !(1..=MAX_PAGE_LIMIT).contains(&size) {
            return Err(AppError::BadRequest(format!(
                "page size must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(request)
    }
}

/// Query parameters for the filtered product list.
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub q: Option<String>,
}

/// Form body for saving dates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationForm {
    pub expiration_date: String,
    #[serde(default)]
    pub warning_date: Option<String>,
}

/// Form body for activation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusForm {
    pub expiration_status: String,
}

fn resolve_product_id(id: &str) -> Result<String, AppError> {
    product_gid(id).ok_or_else(|| AppError::BadRequest(format!("invalid product id: {id}")))
}

fn parse_date(field: ExpirationField, raw: &str) -> Result<NaiveDate, AppError> {
    match FieldValue::parse_for(field, raw) {
        Ok(FieldValue::Date(date)) => Ok(date),
        Ok(FieldValue::Flag(_)) => Err(AppError::Internal(format!(
            "{} is not a date field",
            field.key()
        ))),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}

/// One page of products in either direction.
///
/// # Errors
///
/// Returns 400 for conflicting or out-of-range paging parameters, 502 if
/// Shopify fails.
pub async fn page(
    State(state): State<AppState>,
    CurrentShop(_shop): CurrentShop,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductPage>, AppError> {
    let request = query.into_request()?;
    let page = state.products().fetch_page(&request, Utc::now()).await?;
    Ok(Json(page))
}

/// The whole catalog filtered by `q` (`all` when absent).
///
/// # Errors
///
/// Returns 400 for an unknown filter, 502 if any page fails.
pub async fn all(
    State(state): State<AppState>,
    CurrentShop(_shop): CurrentShop,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<TrackedProduct>>, AppError> {
    let filter = match query.q.as_deref() {
        None | Some("") => ProductFilter::All,
        Some(raw) => raw.parse::<ProductFilter>().map_err(AppError::BadRequest)?,
    };

    let products = state
        .products()
        .fetch_all(filter, OnFetchError::Propagate, Utc::now())
        .await?;
    Ok(Json(products))
}

/// Product detail.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let product_id = resolve_product_id(&id)?;
    let detail = state
        .products()
        .detail(&shop, &product_id, Utc::now())
        .await?;
    Ok(Json(detail))
}

/// Save the expiration date and warning date.
///
/// An empty or missing `warningDate` is derived from the shop's warning
/// period.
///
/// # Errors
///
/// Returns 400 for malformed dates or a warning date after the expiration date.
pub async fn save_expiration(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Path(id): Path<String>,
    Form(form): Form<ExpirationForm>,
) -> Result<Json<SaveExpirationOutcome>, AppError> {
    let product_id = resolve_product_id(&id)?;
    let expiration = parse_date(ExpirationField::ExpirationDate, &form.expiration_date)?;
    let warning = form
        .warning_date
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_date(ExpirationField::WarningDate, raw))
        .transpose()?;

    let outcome = state
        .metafields()
        .save_expiration(&shop, &product_id, expiration, warning)
        .await?;
    Ok(Json(outcome))
}

/// Activate or deactivate expiration tracking.
///
/// # Errors
///
/// Returns 400 if `expirationStatus` is not `true`/`false`, or when
/// activating a product without dates.
pub async fn set_status(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Json<UpsertOutcome>, AppError> {
    let product_id = resolve_product_id(&id)?;
    let active = match FieldValue::parse_for(ExpirationField::Status, &form.expiration_status) {
        Ok(FieldValue::Flag(flag)) => flag,
        Ok(FieldValue::Date(_)) => {
            return Err(AppError::Internal("status is not a flag field".to_string()));
        }
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };

    let outcome = state
        .metafields()
        .set_status(&shop, &product_id, active)
        .await?;
    Ok(Json(outcome))
}
