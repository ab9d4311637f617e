//! Admin auth routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::auth::admin_login;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// The signed-in administrator as returned to the client.
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub email: String,
}

/// Admin login: verifies credentials and the admin role.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<AdminResponse>> {
    let user = admin_login(state.pool(), &form.email, &form.password).await?;

    let admin = CurrentAdmin { id: user.id, email: user.email.clone() };
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "admin signed in");
    Ok(Json(AdminResponse { email: user.email }))
}

/// Clear the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
