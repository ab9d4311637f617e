//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (pings database)
//!
//! # Pricing
//! GET  /api/pricing                    - Effective prices for the catalog
//!                                        (?slugs=a,b narrows the set)
//!
//! # Checkout
//! POST /api/checkout                   - Submit a cart; returns the order id
//!
//! # Orders
//! GET  /api/orders/{id}                - Order detail with payment methods
//! POST /api/orders/{id}/payment-email  - Send the payment-instructions email
//!
//! # Auth
//! POST /api/auth/register              - Create a customer account
//! POST /api/auth/login                 - Login, stores user in session
//! POST /api/auth/logout                - Clear the session user
//!
//! # Account (requires auth)
//! GET  /api/account                    - Profile and order history
//! ```

pub mod account;
pub mod auth;
pub mod checkout;
pub mod orders;
pub mod pricing;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the full storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pricing", get(pricing::index))
        .route("/api/checkout", post(checkout::submit))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/payment-email", post(orders::send_payment_email))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/account", get(account::show))
}
