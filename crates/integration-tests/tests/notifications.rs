//! Notification dispatcher integration tests: at-most-once audits against
//! real order rows.

use std::sync::Arc;

use solstice_core::{OrderStatus, PaymentMethod};
use solstice_integration_tests::{CountingMailer, checkout_request, test_pool};
use solstice_orders::checkout;
use solstice_orders::config::PaymentConfig;
use solstice_orders::db::OrderRepository;
use solstice_orders::mailer::Mailer;
use solstice_orders::notify::{EmailCategory, Notifier, SendOutcome};
use solstice_orders::spot::FixedSpotPrice;
use solstice_orders::transitions::{self, TransitionRequest};

fn notifier(pool: sqlx::PgPool, mailer: Option<Arc<dyn Mailer>>) -> Notifier {
    Notifier::new(
        pool,
        mailer,
        Arc::new(FixedSpotPrice(None)),
        PaymentConfig::from_env(),
        "https://solsticelabs.dev",
    )
}

#[tokio::test]
async fn test_receipt_is_sent_at_most_once() {
    let Some(pool) = test_pool().await else { return };
    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("glutathione-600mg", 1, "notify-1@example.com"),
    )
    .await
    .expect("commit");

    let mailer = CountingMailer::new(false);
    let notifier = notifier(pool.clone(), Some(mailer.clone()));

    let outcome = notifier.send(EmailCategory::Receipt, order_id).await.expect("send");
    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(mailer.call_count(), 1);

    // Audit timestamp was persisted after transport success.
    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert!(order.receipt_email_sent_at.is_some());

    // Retrying never invokes the transport again.
    let outcome = notifier.send(EmailCategory::Receipt, order_id).await.expect("send");
    assert_eq!(outcome, SendOutcome::AlreadySent);
    assert_eq!(mailer.call_count(), 1);
}

#[tokio::test]
async fn test_failed_transport_leaves_audit_unset_for_retry() {
    let Some(pool) = test_pool().await else { return };
    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("glutathione-600mg", 1, "notify-2@example.com"),
    )
    .await
    .expect("commit");

    let failing = CountingMailer::new(true);
    let outcome = notifier(pool.clone(), Some(failing.clone()))
        .send(EmailCategory::PaymentInstructions, order_id)
        .await
        .expect("send");
    assert_eq!(outcome, SendOutcome::Failed);

    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert!(order.payment_email_sent_at.is_none());

    // A later retry with a working transport succeeds.
    let working = CountingMailer::new(false);
    let outcome = notifier(pool.clone(), Some(working.clone()))
        .send(EmailCategory::PaymentInstructions, order_id)
        .await
        .expect("send");
    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(working.call_count(), 1);
}

#[tokio::test]
async fn test_no_provider_skips_and_sets_no_audit() {
    let Some(pool) = test_pool().await else { return };
    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("glutathione-600mg", 1, "notify-3@example.com"),
    )
    .await
    .expect("commit");

    let outcome = notifier(pool.clone(), None)
        .send(EmailCategory::Receipt, order_id)
        .await
        .expect("send");
    assert_eq!(outcome, SendOutcome::SkippedNoProvider);

    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert!(order.receipt_email_sent_at.is_none());
}

#[tokio::test]
async fn test_status_email_once_per_target_status() {
    let Some(pool) = test_pool().await else { return };
    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("glutathione-600mg", 1, "notify-4@example.com"),
    )
    .await
    .expect("commit");

    let mailer = CountingMailer::new(false);
    let notifier = notifier(pool.clone(), Some(mailer.clone()));

    // pending -> paid, announce once
    let mut paid = TransitionRequest {
        status: OrderStatus::Paid,
        mail_service: None,
        tracking_number: None,
        payment_method: Some(PaymentMethod::Venmo),
    };
    transitions::apply(&pool, order_id, &paid).await.expect("paid");

    let outcome = notifier.send(EmailCategory::StatusUpdate, order_id).await.expect("send");
    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(mailer.call_count(), 1);

    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert_eq!(order.status_email_for, Some(OrderStatus::Paid));

    // Retrying the same announcement is suppressed.
    let outcome = notifier.send(EmailCategory::StatusUpdate, order_id).await.expect("send");
    assert_eq!(outcome, SendOutcome::AlreadySent);
    assert_eq!(mailer.call_count(), 1);

    // A genuine further transition announces again.
    paid.status = OrderStatus::Shipped;
    paid.payment_method = None;
    paid.mail_service = Some("USPS".to_string());
    paid.tracking_number = Some("9400100000000000000000".to_string());
    transitions::apply(&pool, order_id, &paid).await.expect("shipped");

    let outcome = notifier.send(EmailCategory::StatusUpdate, order_id).await.expect("send");
    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(mailer.call_count(), 2);
}
