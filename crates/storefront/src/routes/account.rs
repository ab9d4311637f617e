//! Account overview for signed-in customers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use solstice_orders::db::{OrderRepository, UserRepository};
use solstice_orders::models::{CustomerAddress, Order};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Account overview: profile plus order history.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub default_address: Option<CustomerAddress>,
    pub orders: Vec<Order>,
}

/// Profile and order history for the signed-in customer.
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>> {
    let users = UserRepository::new(state.pool());
    let profile = users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;
    let default_address = users.get_default_address(user.id).await?;

    let orders = OrderRepository::new(state.pool()).list_for_customer(user.id).await?;

    Ok(Json(AccountResponse {
        email: profile.email,
        name: profile.name,
        phone: profile.phone,
        default_address,
        orders,
    }))
}
