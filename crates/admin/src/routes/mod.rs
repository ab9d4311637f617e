//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings database)
//!
//! # Auth
//! POST /api/auth/login              - Admin login (role-checked)
//! POST /api/auth/logout             - Clear the admin session
//!
//! # Overrides
//! GET    /api/overrides             - List price/inventory overrides
//! PUT    /api/overrides/{slug}      - Upsert an override (both fields null deletes)
//! DELETE /api/overrides/{slug}      - Delete an override
//!
//! # Orders
//! GET  /api/orders                  - Recent orders
//! GET  /api/orders/{id}             - Order detail with items
//! POST /api/orders/{id}/status      - Apply a status transition
//! ```

pub mod auth;
pub mod orders;
pub mod overrides;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the full admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/overrides", get(overrides::index))
        .route(
            "/api/overrides/{slug}",
            put(overrides::upsert).delete(overrides::delete),
        )
        .route("/api/orders", get(orders::index))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/status", post(orders::update_status))
}
