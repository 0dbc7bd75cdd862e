//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Database readiness
//!
//! GET    /api/dashboard                - Product stats + recent audit logs
//!
//! GET    /api/products                 - One page (first/after or last/before)
//! GET    /api/products/all?q=          - Whole catalog, filtered
//! GET    /api/products/{id}            - Product detail
//! POST   /api/products/{id}/expiration - Save expiration + warning dates (form)
//! POST   /api/products/{id}/status     - Activate / deactivate (form)
//!
//! GET    /api/logs?take&cursor         - Audit logs, ascending after cursor
//! GET    /api/logs/{id}                - Single audit log
//! DELETE /api/logs/{id}                - Delete audit log
//!
//! GET    /api/settings                 - Settings with defaults applied
//! POST   /api/settings                 - Save warning period (form)
//! ```
//!
//! `{id}` for products is a numeric id or a full product GID.

pub mod dashboard;
pub mod health;
pub mod logs;
pub mod products;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the full route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/dashboard", get(dashboard::show))
        .route("/api/products", get(products::page))
        .route("/api/products/all", get(products::all))
        .route("/api/products/{id}", get(products::show))
        .route(
            "/api/products/{id}/expiration",
            post(products::save_expiration),
        )
        .route("/api/products/{id}/status", post(products::set_status))
        .route("/api/logs", get(logs::index))
        .route("/api/logs/{id}", get(logs::show).delete(logs::delete))
        .route("/api/settings", get(settings::show).post(settings::save))
}
