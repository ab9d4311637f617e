//! Database operations for the order pipeline (`PostgreSQL`).
//!
//! ## Tables
//!
//! - `product_overrides` - Admin price/inventory overrides (the only place
//!   inventory exists; the catalog itself is compiled in)
//! - `orders` / `order_items` - Committed orders and their frozen line items
//! - `users` - Customer and admin accounts
//! - `customer_addresses` - One default shipping address per customer
//!
//! # Migrations
//!
//! Migrations are stored in `crates/orders/migrations/` and run via:
//! ```bash
//! cargo run -p solstice-cli -- migrate
//! ```

pub mod orders;
pub mod overrides;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use overrides::OverrideRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Embedded SQL migrations for the order pipeline schema.
#[must_use]
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
