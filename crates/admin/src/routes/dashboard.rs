//! Dashboard route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::CurrentShop;
use crate::models::AuditLog;
use crate::services::ProductStats;
use crate::state::AppState;

const RECENT_LOGS: i64 = 10;

/// Dashboard payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: ProductStats,
    pub recent_logs: Vec<AuditLog>,
}

/// Product counters plus the most recent audit entries.
///
/// A Shopify failure yields zeroed stats rather than an error page.
///
/// # Errors
///
/// Returns 500 if the audit log cannot be read.
pub async fn show(
    State(state): State<AppState>,
    CurrentShop(shop): CurrentShop,
) -> Result<Json<Dashboard>, AppError> {
    let stats = state.products().stats(Utc::now()).await?;
    let recent_logs = state.logs().recent(&shop, RECENT_LOGS).await?;
    Ok(Json(Dashboard { stats, recent_logs }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::StatusCode;
    use expiration_manager_core::{ExpirationField, ShopDomain};

    use super::super::test_support::{app, get, json, send};
    use crate::db::AuditLogStore;
    use crate::models::NewAuditLog;
    use crate::shopify::MockCatalog;
    use crate::shopify::mock::{product, product_with};

    #[tokio::test]
    async fn test_dashboard_counts_and_recent_logs() {
        let app = app(MockCatalog::with_products(vec![
            product_with(
                1,
                &[
                    (ExpirationField::ExpirationDate, "2000-01-02"),
                    (ExpirationField::Status, "true"),
                ],
            ),
            product(2),
        ]));
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        for i in 0..12 {
            app.logs
                .append(&shop, NewAuditLog::success("test.action", format!("entry {i}")))
                .await
                .unwrap();
        }

        let resp = send(&app.router, get("/api/dashboard")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json(resp).await;
        assert_eq!(body["stats"]["active"], 1);
        assert_eq!(body["stats"]["inactive"], 1);
        assert_eq!(body["stats"]["expired"], 1);
        assert_eq!(body["stats"]["expireSoon"], 0);

        let recent = body["recentLogs"].as_array().unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0]["id"], 12);
    }

    #[tokio::test]
    async fn test_dashboard_survives_catalog_failure() {
        let app = app(MockCatalog::with_products(vec![product(1)]));
        app.catalog.set_fail_on_read(true).await;

        let resp = send(&app.router, get("/api/dashboard")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json(resp).await;
        assert_eq!(body["stats"]["active"], 0);
        assert_eq!(body["stats"]["inactive"], 0);
    }
}
