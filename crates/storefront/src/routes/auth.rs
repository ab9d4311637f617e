//! Customer auth routes (register, login, logout).

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use solstice_orders::models::UserRole;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Credentials for register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// The signed-in user as returned to the client.
#[derive(Debug, Serialize)]
pub struct SessionUserResponse {
    pub email: String,
    pub role: UserRole,
}

/// Create a customer account and sign in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CredentialsForm>,
) -> Result<Json<SessionUserResponse>> {
    let user = AuthService::new(state.pool()).register(&form.email, &form.password).await?;

    let current = CurrentUser { id: user.id, email: user.email.clone(), role: user.role };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "customer registered");
    Ok(Json(SessionUserResponse { email: user.email, role: user.role }))
}

/// Login with email and password.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CredentialsForm>,
) -> Result<Json<SessionUserResponse>> {
    let user = AuthService::new(state.pool()).login(&form.email, &form.password).await?;

    let current = CurrentUser { id: user.id, email: user.email.clone(), role: user.role };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(SessionUserResponse { email: user.email, role: user.role }))
}

/// Clear the session user.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
