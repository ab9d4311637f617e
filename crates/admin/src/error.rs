//! Unified admin error handling with Sentry integration.
//!
//! Responses are JSON with an operator-actionable message: validation
//! failures name the missing requirement so the operator can fix the form
//! and resubmit.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use solstice_orders::OrderError;
use solstice_orders::db::RepositoryError;

use crate::services::auth::AuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order pipeline failure (transitions, notifications).
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

    /// Bad request from operator.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
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
            Self::Order(err) => match err {
                OrderError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
                OrderError::OrderNotFound => (StatusCode::NOT_FOUND, err.to_string()),
                OrderError::InvalidInput(_) | OrderError::UnknownProduct { .. } => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                OrderError::OutOfStock { .. } => (StatusCode::CONFLICT, err.to_string()),
                OrderError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
                OrderError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
            Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::NotAnAdmin => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
                }
                AuthError::Hash(_) | AuthError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
