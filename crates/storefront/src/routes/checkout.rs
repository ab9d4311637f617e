//! Checkout submission.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use solstice_core::OrderId;
use solstice_orders::checkout::{self, CheckoutRequest};
use solstice_orders::notify::{EmailCategory, SendOutcome};

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Response for a committed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    /// Outcome of the receipt email. Informational only - the order stands
    /// regardless of what happened to the email.
    pub receipt_email: SendOutcome,
}

/// Commit a checkout and send the receipt.
///
/// The commit is all-or-nothing; the receipt send happens after the order
/// is durable and its failure is surfaced as a soft outcome, never as a
/// checkout failure.
#[instrument(skip(state, request))]
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let customer_id = user.map(|u| u.id);

    let order_id = checkout::commit(state.pool(), customer_id, &request).await?;

    let receipt_email = match state.notifier().send(EmailCategory::Receipt, order_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(order_id = %order_id, error = %e, "receipt email errored after commit");
            SendOutcome::Failed
        }
    };

    Ok(Json(CheckoutResponse { order_id, receipt_email }))
}
