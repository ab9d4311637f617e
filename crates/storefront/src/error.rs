//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses are JSON: `{"error": "..."}` with the
//! customer-facing message, never internal detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use solstice_orders::OrderError;
use solstice_orders::db::RepositoryError;

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order pipeline failure (checkout, pricing, notifications).
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Order(OrderError::Repository(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message) = match &self {
            Self::Order(err) => order_error_response(err),
            Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Auth(err) => auth_error_response(err),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Map pipeline errors onto status codes, keeping the customer-facing
/// messages (they are written to be shown as-is).
fn order_error_response(err: &OrderError) -> (StatusCode, String) {
    match err {
        OrderError::InvalidInput(_) | OrderError::UnknownProduct { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderError::OutOfStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        OrderError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        OrderError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        OrderError::OrderNotFound => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}

fn auth_error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
        }
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "An account with this email already exists".to_string(),
        ),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "Invalid email address".to_string()),
        AuthError::Hash(_) | AuthError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_maps_to_conflict_with_product_message() {
        let err = AppError::Order(OrderError::OutOfStock {
            name: "BPC-157".to_string(),
            variant_label: "10mg".to_string(),
            requested: 2,
            available: 0,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let (_, message) = order_error_response(&OrderError::Repository(
            RepositoryError::DataCorruption("secret table broke".to_string()),
        ));
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_validation_maps_to_unprocessable() {
        let err = AppError::Order(OrderError::Validation("missing tracking".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unknown_product_maps_to_bad_request() {
        let err = AppError::Order(OrderError::UnknownProduct { slug: "nope".to_string() });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
