//! Audit log route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use expiration_manager_core::LogId;

use crate::config::MAX_PAGE_LIMIT;
use crate::error::AppError;
use crate::middleware::CurrentShop;
use crate::models::AuditLog;
use crate::state::AppState;

const DEFAULT_TAKE: i64 = 10;

/// Query parameters for the log listing.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub take: Option<i64>,
    pub cursor: Option<i32>,
}

/// One page of logs plus the cursor for the next call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsPage {
    pub logs: Vec<AuditLog>,
    /// Id of the last record returned; `None` once the page is short.
    pub next_cursor: Option<LogId>,
}

/// List logs ascending by id, starting after `cursor`.
///
/// # Errors
///
/// Returns 400 if `take` is out of range.
pub async fn index(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsPage>, AppError> {
    let take = query.take.unwrap_or(DEFAULT_TAKE);
    if !(1..=MAX_PAGE_LIMIT).contains(&take) {
        return Err(AppError::BadRequest(format!(
            "take must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }

    let logs = state
        .logs()
        .list(&shop, take, query.cursor.map(LogId::new))
        .await?;

    let full = i64::try_from(logs.len()).is_ok_and(|len| len == take);
    let next_cursor = if full { logs.last().map(|l| l.id) } else { None };

    Ok(Json(LogsPage { logs, next_cursor }))
}

/// A single log.
///
/// # Errors
///
/// Returns 404 if the log does not exist for this shop.
pub async fn show(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Path(id): Path<i32>,
) -> Result<Json<AuditLog>, AppError> {
    state
        .logs()
        .get(LogId::new(id), &shop)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("log {id}")))
}

/// Delete a log.
///
/// # Errors
///
/// Returns 404 if the log does not exist for this shop.
pub async fn delete(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if state.logs().delete(LogId::new(id), &shop).await? {
        tracing::info!(log_id = id, "Deleted audit log");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("log {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{body::Body, http::Request};
    use expiration_manager_core::ShopDomain;

    use super::super::test_support::{app, delete as delete_req, get, json, send};
    use super::*;
    use crate::db::AuditLogStore;
    use crate::models::NewAuditLog;
    use crate::shopify::MockCatalog;

    async fn seed(store: &dyn AuditLogStore, shop: &str, n: usize) {
        let shop = ShopDomain::parse(shop).unwrap();
        for i in 0..n {
            store
                .append(&shop, NewAuditLog::success("test.action", format!("entry {i}")))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_index_pages_with_cursor() {
        let app = app(MockCatalog::new());
        seed(app.logs.as_ref(), "store.myshopify.com", 5).await;

        let body = json(send(&app.router, get("/api/logs?take=2")).await).await;
        assert_eq!(body["logs"].as_array().unwrap().len(), 2);
        assert_eq!(body["logs"][0]["id"], 1);
        assert_eq!(body["nextCursor"], 2);

        let body = json(send(&app.router, get("/api/logs?take=2&cursor=4")).await).await;
        assert_eq!(body["logs"].as_array().unwrap().len(), 1);
        assert_eq!(body["logs"][0]["id"], 5);
        assert!(body["nextCursor"].is_null());
    }

    #[tokio::test]
    async fn test_index_default_take_and_bounds() {
        let app = app(MockCatalog::new());
        seed(app.logs.as_ref(), "store.myshopify.com", 12).await;

        let body = json(send(&app.router, get("/api/logs")).await).await;
        assert_eq!(body["logs"].as_array().unwrap().len(), 10);

        let resp = send(&app.router, get("/api/logs?take=0")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logs_are_scoped_to_shop() {
        let app = app(MockCatalog::new());
        seed(app.logs.as_ref(), "other.myshopify.com", 1).await;
        seed(app.logs.as_ref(), "store.myshopify.com", 1).await;

        let body = json(send(&app.router, get("/api/logs")).await).await;
        assert_eq!(body["logs"].as_array().unwrap().len(), 1);
        assert_eq!(body["logs"][0]["shop"], "store.myshopify.com");

        let resp = send(&app.router, get("/api/logs/1")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = send(&app.router, delete_req("/api/logs/1")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.logs.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_show_and_delete() {
        let app = app(MockCatalog::new());
        seed(app.logs.as_ref(), "store.myshopify.com", 1).await;

        let resp = send(&app.router, get("/api/logs/1")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json(resp).await;
        assert_eq!(body["type"], "success");
        assert_eq!(body["action"], "test.action");

        let resp = send(&app.router, delete_req("/api/logs/1")).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = send(&app.router, get("/api/logs/1")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_shop_header_is_forbidden() {
        let app = app(MockCatalog::new());
        let request = Request::builder()
            .uri("/api/logs")
            .header("x-shopify-shop-domain", "other.myshopify.com")
            .body(Body::empty())
            .unwrap();
        let resp = send(&app.router, request).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
