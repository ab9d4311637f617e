//! Status state machine integration tests against real order rows.

use solstice_core::{OrderId, OrderStatus, PaymentMethod};
use solstice_integration_tests::{checkout_request, test_pool};
use solstice_orders::OrderError;
use solstice_orders::checkout;
use solstice_orders::db::OrderRepository;
use solstice_orders::transitions::{self, TransitionRequest};

async fn fresh_order(pool: &sqlx::PgPool, email: &str) -> OrderId {
    checkout::commit(pool, None, &checkout_request("tesamorelin-10mg", 1, email))
        .await
        .expect("commit fixture order")
}

fn request(status: OrderStatus) -> TransitionRequest {
    TransitionRequest {
        status,
        mail_service: None,
        tracking_number: None,
        payment_method: None,
    }
}

#[tokio::test]
async fn test_shipped_requires_tracking_and_leaves_status_unchanged() {
    let Some(pool) = test_pool().await else { return };
    let order_id = fresh_order(&pool, "transitions-1@example.com").await;

    let err = transitions::apply(&pool, order_id, &request(OrderStatus::Shipped))
        .await
        .expect_err("missing shipment fields");
    assert!(matches!(err, OrderError::Validation(_)));

    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.shipped_at.is_none());
}

#[tokio::test]
async fn test_full_lifecycle_pending_paid_shipped() {
    let Some(pool) = test_pool().await else { return };
    let order_id = fresh_order(&pool, "transitions-2@example.com").await;

    // pending -> paid requires the confirmed channel
    let err = transitions::apply(&pool, order_id, &request(OrderStatus::Paid))
        .await
        .expect_err("missing payment method");
    assert!(matches!(err, OrderError::Validation(_)));

    let mut paid = request(OrderStatus::Paid);
    paid.payment_method = Some(PaymentMethod::Cashapp);
    let outcome = transitions::apply(&pool, order_id, &paid).await.expect("paid");
    assert!(outcome.changed);
    assert_eq!(outcome.order.status, OrderStatus::Paid);
    assert_eq!(outcome.order.payment_method, PaymentMethod::Cashapp);

    // paid -> shipped with carrier and tracking stamps shipped_at
    let mut shipped = request(OrderStatus::Shipped);
    shipped.mail_service = Some("USPS".to_string());
    shipped.tracking_number = Some("9400100000000000000000".to_string());
    let outcome = transitions::apply(&pool, order_id, &shipped).await.expect("shipped");
    assert!(outcome.changed);
    assert_eq!(outcome.order.mail_service.as_deref(), Some("USPS"));
    assert!(outcome.order.shipped_at.is_some());
}

#[tokio::test]
async fn test_leaving_shipped_clears_shipment_fields() {
    let Some(pool) = test_pool().await else { return };
    let order_id = fresh_order(&pool, "transitions-3@example.com").await;

    let mut shipped = request(OrderStatus::Shipped);
    shipped.mail_service = Some("UPS".to_string());
    shipped.tracking_number = Some("1Z999AA10123456784".to_string());
    transitions::apply(&pool, order_id, &shipped).await.expect("shipped");

    let outcome = transitions::apply(&pool, order_id, &request(OrderStatus::Pending))
        .await
        .expect("back to pending");
    assert!(outcome.changed);
    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert!(outcome.order.mail_service.is_none());
    assert!(outcome.order.tracking_number.is_none());
    assert!(outcome.order.shipped_at.is_none());
}

#[tokio::test]
async fn test_no_op_save_reports_unchanged() {
    let Some(pool) = test_pool().await else { return };
    let order_id = fresh_order(&pool, "transitions-4@example.com").await;

    let outcome = transitions::apply(&pool, order_id, &request(OrderStatus::Pending))
        .await
        .expect("no-op save is not an error");
    assert!(!outcome.changed);
    assert_eq!(outcome.order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_canceled_is_terminal() {
    let Some(pool) = test_pool().await else { return };
    let order_id = fresh_order(&pool, "transitions-5@example.com").await;

    let outcome = transitions::apply(&pool, order_id, &request(OrderStatus::Canceled))
        .await
        .expect("cancel from pending");
    assert!(outcome.changed);

    let err = transitions::apply(&pool, order_id, &request(OrderStatus::Pending))
        .await
        .expect_err("terminal state");
    assert!(matches!(err, OrderError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let Some(pool) = test_pool().await else { return };

    let missing = OrderId::generate();
    let err = transitions::apply(&pool, missing, &request(OrderStatus::Canceled))
        .await
        .expect_err("no such order");
    assert!(matches!(err, OrderError::OrderNotFound));
}
