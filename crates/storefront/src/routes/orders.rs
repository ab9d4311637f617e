//! Order detail and payment-instruction routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use solstice_core::OrderId;
use solstice_orders::db::OrderRepository;
use solstice_orders::models::{Order, OrderItem};
use solstice_orders::notify::{EmailCategory, SendOutcome};
use solstice_orders::payments::{self, ManualPaymentMethod, order_memo};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Order detail response for the thank-you page.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    /// Recomputed on every request; the BTC quote is live, never cached.
    pub payment_methods: Vec<ManualPaymentMethod>,
    pub memo: String,
}

/// Response for an explicit email trigger.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub result: SendOutcome,
}

/// Order detail, including the manual payment methods with a live BTC
/// quote. The order id is the access capability, as on the original
/// thank-you page: guests hold it from checkout.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await.map_err(AppError::Database)?;

    let payment_methods = payments::methods_with_quote(
        &state.config().payment,
        state.spot(),
        order.id,
        order.total_cents,
    )
    .await;

    Ok(Json(OrderDetailResponse {
        order_number: order.id.order_number(),
        memo: order_memo(order.id),
        items,
        payment_methods,
        order,
    }))
}

/// Send (or re-send) the payment-instructions email for an order.
///
/// Safe to retry: the notifier's audit short-circuits a second send.
#[instrument(skip(state))]
pub async fn send_payment_email(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<SendEmailResponse>> {
    let result = state.notifier().send(EmailCategory::PaymentInstructions, id).await?;

    Ok(Json(SendEmailResponse { result }))
}
