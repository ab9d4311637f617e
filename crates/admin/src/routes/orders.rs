//! Order management: listing, detail, status transitions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solstice_core::{OrderId, OrderStatus, PaymentMethod};
use solstice_orders::db::OrderRepository;
use solstice_orders::models::{Order, OrderItem};
use solstice_orders::notify::{EmailCategory, SendOutcome};
use solstice_orders::transitions::{self, TransitionRequest};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Query parameters for the order list.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Order list response.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// Order detail response.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Status update form.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusForm {
    pub status: OrderStatus,
    #[serde(default)]
    pub mail_service: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Status update response. `status_email` is a soft outcome: the status
/// change stands even when the notification could not be delivered.
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub status: OrderStatus,
    pub changed: bool,
    pub status_email: Option<SendOutcome>,
}

/// Recent orders, newest first.
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrdersResponse>> {
    let limit = params.limit.unwrap_or(100).clamp(1, 500);
    let orders = OrderRepository::new(state.pool()).list_recent(limit).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// One order with its line items.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await?;

    Ok(Json(OrderDetailResponse { order, items }))
}

/// Apply a status transition, then announce it.
///
/// The transition is validated and persisted first; the email happens
/// after the row is durable. A no-op save changes nothing and sends
/// nothing. Notification failure is reported in the response as a soft
/// warning, never as a failed status change.
#[instrument(skip(_admin, state, form))]
pub async fn update_status(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(form): Json<UpdateStatusForm>,
) -> Result<Json<UpdateStatusResponse>> {
    let request = TransitionRequest {
        status: form.status,
        mail_service: form.mail_service,
        tracking_number: form.tracking_number,
        payment_method: form.payment_method,
    };

    let outcome = transitions::apply(state.pool(), id, &request).await?;

    let status_email = if outcome.changed {
        match state.notifier().send(EmailCategory::StatusUpdate, id).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(order_id = %id, error = %e, "status email errored after transition");
                Some(SendOutcome::Failed)
            }
        }
    } else {
        None
    };

    Ok(Json(UpdateStatusResponse {
        status: outcome.order.status,
        changed: outcome.changed,
        status_email,
    }))
}
