//! Price/inventory override management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solstice_core::catalog::find_product;
use solstice_orders::db::OverrideRepository;
use solstice_orders::models::PriceOverride;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Upsert body. Both fields null clears the override entirely.
#[derive(Debug, Deserialize)]
pub struct UpsertOverrideForm {
    pub price_cents: Option<i64>,
    pub inventory: Option<i32>,
}

/// List response.
#[derive(Debug, Serialize)]
pub struct OverridesResponse {
    pub overrides: Vec<PriceOverride>,
}

/// List every override, newest edit first.
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OverridesResponse>> {
    let overrides = OverrideRepository::new(state.pool()).list().await?;
    Ok(Json(OverridesResponse { overrides }))
}

/// Create or replace the override for a product.
///
/// Negative values are rejected; a body with both fields null deletes the
/// row, matching the rule that "no override" is never stored.
#[instrument(skip(_admin, state, form))]
pub async fn upsert(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<UpsertOverrideForm>,
) -> Result<Json<serde_json::Value>> {
    if find_product(&slug).is_none() {
        return Err(AppError::BadRequest(format!("Unknown product: {slug}")));
    }
    if form.price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price_cents must be >= 0".to_string()));
    }
    if form.inventory.is_some_and(|i| i < 0) {
        return Err(AppError::BadRequest("inventory must be >= 0".to_string()));
    }

    OverrideRepository::new(state.pool())
        .upsert(&slug, form.price_cents, form.inventory)
        .await?;

    tracing::info!(slug = %slug, price_cents = ?form.price_cents, inventory = ?form.inventory, "override upserted");
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Delete the override for a product.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let deleted = OverrideRepository::new(state.pool()).delete(&slug).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
