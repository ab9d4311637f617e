//! Order pipeline error taxonomy.
//!
//! Everything a caller can observe from the pipeline maps onto one of these
//! variants. The web layers translate them into HTTP responses; the
//! messages on the customer-facing variants are written to be shown as-is.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors produced by the order commit pipeline and the status machine.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed or out-of-range request data. Rejected before any write.
    #[error("{0}")]
    InvalidInput(String),

    /// A requested slug is not in the catalog. The whole request is
    /// rejected; lines are never silently dropped.
    #[error("Unknown product: {slug}")]
    UnknownProduct { slug: String },

    /// A conditional inventory decrement found fewer units than requested.
    /// Detected mid-transaction; every earlier write is rolled back.
    #[error("{name} {variant_label} is out of stock (requested {requested}, available {available}).")]
    OutOfStock {
        name: String,
        variant_label: String,
        requested: i32,
        available: i32,
    },

    /// A state-machine precondition failed. The message names the missing
    /// requirement so the operator can fix the form and resubmit.
    #[error("{0}")]
    Validation(String),

    /// Role or session check failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The requested order does not exist.
    #[error("Order not found")]
    OrderNotFound,

    /// Storage failure underneath the pipeline.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}
