//! Operator-driven order status transitions.
//!
//! Validation happens in one place, against the transition table in
//! `solstice-core`, before anything is persisted. A refused transition
//! leaves the order untouched; a no-op save (same status) writes nothing
//! and triggers nothing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use solstice_core::{OrderId, OrderStatus, PaymentMethod, TransitionError, allowed_transition};

use crate::db::OrderRepository;
use crate::db::orders::StatusPatch;
use crate::error::OrderError;
use crate::models::Order;

/// An operator's status edit as submitted from the admin panel.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    /// Carrier name; required when entering `shipped`.
    pub mail_service: Option<String>,
    /// Required when entering `shipped`.
    pub tracking_number: Option<String>,
    /// The manual channel the money actually arrived through; required when
    /// entering `paid`.
    pub payment_method: Option<PaymentMethod>,
}

/// Result of applying a transition.
#[derive(Debug)]
pub struct TransitionOutcome {
    /// The order as stored after the call.
    pub order: Order,
    /// Whether the stored status actually changed. Only a `true` outcome
    /// should trigger a status notification.
    pub changed: bool,
}

/// Validate and apply a status transition.
///
/// The caller is responsible for sending the status notification when the
/// outcome reports a change; the notifier's per-target-status audit makes
/// repeated sends safe.
///
/// # Errors
///
/// - `OrderError::OrderNotFound` if the order does not exist
/// - `OrderError::Validation` when the transition is not allowed or a
///   required field is missing; the order keeps its prior status
/// - `OrderError::Repository` for storage failures
#[instrument(skip(pool, request), fields(status = %request.status))]
pub async fn apply(
    pool: &PgPool,
    order_id: OrderId,
    request: &TransitionRequest,
) -> Result<TransitionOutcome, OrderError> {
    let repo = OrderRepository::new(pool);
    let order = repo.get(order_id).await?.ok_or(OrderError::OrderNotFound)?;

    let Some(patch) = validate_and_patch(order.status, request, Utc::now())? else {
        // Re-saving the current status is a no-op: nothing persisted,
        // nothing announced.
        return Ok(TransitionOutcome { order, changed: false });
    };

    let order = repo.apply_status_patch(order_id, &patch).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => OrderError::OrderNotFound,
        other => OrderError::Repository(other),
    })?;

    tracing::info!(order_id = %order_id, status = %order.status, "order status changed");

    Ok(TransitionOutcome { order, changed: true })
}

/// Pure transition check: `Ok(None)` for a no-op save, `Ok(Some(patch))`
/// for a permitted change, `Err` for a refused one.
fn validate_and_patch(
    current: OrderStatus,
    request: &TransitionRequest,
    now: DateTime<Utc>,
) -> Result<Option<StatusPatch>, OrderError> {
    let rule = match allowed_transition(current, request.status) {
        Ok(rule) => rule,
        Err(TransitionError::NoChange(_)) => return Ok(None),
        Err(err @ TransitionError::Terminal(_)) => {
            return Err(OrderError::Validation(err.to_string()));
        }
    };

    let payment_method = if rule.requires_payment_method {
        Some(request.payment_method.ok_or_else(|| {
            OrderError::Validation(
                "A confirmed payment method is required to mark an order as paid.".to_string(),
            )
        })?)
    } else {
        None
    };

    let (mail_service, tracking_number, shipped_at) = if rule.requires_shipment_fields {
        let mail_service = non_empty(request.mail_service.as_deref());
        let tracking_number = non_empty(request.tracking_number.as_deref());
        match (mail_service, tracking_number) {
            (Some(mail_service), Some(tracking_number)) => {
                (Some(mail_service), Some(tracking_number), Some(now))
            }
            _ => {
                return Err(OrderError::Validation(
                    "Mail service and tracking number are required to mark an order as shipped."
                        .to_string(),
                ));
            }
        }
    } else {
        // Shipment fields carry no meaning outside `shipped`; always store
        // them cleared so stale tracking data cannot survive a move away.
        (None, None, None)
    };

    Ok(Some(StatusPatch {
        status: request.status,
        mail_service,
        tracking_number,
        shipped_at,
        payment_method,
    }))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: OrderStatus) -> TransitionRequest {
        TransitionRequest {
            status,
            mail_service: None,
            tracking_number: None,
            payment_method: None,
        }
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        let result = validate_and_patch(OrderStatus::Pending, &request(OrderStatus::Pending), Utc::now());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_paid_requires_payment_method() {
        let err = validate_and_patch(OrderStatus::Pending, &request(OrderStatus::Paid), Utc::now())
            .expect_err("missing payment method");
        assert!(matches!(err, OrderError::Validation(_)));

        let mut req = request(OrderStatus::Paid);
        req.payment_method = Some(PaymentMethod::Cashapp);
        let patch = validate_and_patch(OrderStatus::Pending, &req, Utc::now())
            .expect("allowed")
            .expect("changed");
        assert_eq!(patch.status, OrderStatus::Paid);
        assert_eq!(patch.payment_method, Some(PaymentMethod::Cashapp));
        assert!(patch.shipped_at.is_none());
    }

    #[test]
    fn test_shipped_requires_carrier_and_tracking() {
        // Missing both
        let err = validate_and_patch(OrderStatus::Paid, &request(OrderStatus::Shipped), Utc::now())
            .expect_err("missing shipment fields");
        assert!(matches!(err, OrderError::Validation(_)));

        // Whitespace-only tracking number is still missing
        let mut req = request(OrderStatus::Shipped);
        req.mail_service = Some("USPS".to_string());
        req.tracking_number = Some("   ".to_string());
        let err = validate_and_patch(OrderStatus::Paid, &req, Utc::now())
            .expect_err("blank tracking number");
        assert!(matches!(err, OrderError::Validation(_)));

        // Both present
        req.tracking_number = Some("9400 1000 0000 0000 0000 00".to_string());
        let now = Utc::now();
        let patch = validate_and_patch(OrderStatus::Paid, &req, now)
            .expect("allowed")
            .expect("changed");
        assert_eq!(patch.status, OrderStatus::Shipped);
        assert_eq!(patch.mail_service.as_deref(), Some("USPS"));
        assert_eq!(patch.shipped_at, Some(now));
    }

    #[test]
    fn test_leaving_shipped_clears_shipment_fields() {
        let patch = validate_and_patch(OrderStatus::Shipped, &request(OrderStatus::Pending), Utc::now())
            .expect("allowed")
            .expect("changed");
        assert_eq!(patch.status, OrderStatus::Pending);
        assert!(patch.mail_service.is_none());
        assert!(patch.tracking_number.is_none());
        assert!(patch.shipped_at.is_none());
    }

    #[test]
    fn test_canceled_is_terminal() {
        let err = validate_and_patch(OrderStatus::Canceled, &request(OrderStatus::Pending), Utc::now())
            .expect_err("terminal state");
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_cancel_needs_no_extra_fields() {
        let patch = validate_and_patch(OrderStatus::Pending, &request(OrderStatus::Canceled), Utc::now())
            .expect("allowed")
            .expect("changed");
        assert_eq!(patch.status, OrderStatus::Canceled);
        assert!(patch.payment_method.is_none());
    }
}
