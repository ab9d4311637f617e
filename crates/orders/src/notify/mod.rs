//! Notification dispatcher.
//!
//! Three email categories, each with its own independent "already sent"
//! audit on the order row, so retrying the surrounding action never
//! double-sends:
//!
//! - `Receipt` - once ever, at order creation
//! - `PaymentInstructions` - once ever, on first explicit request
//! - `StatusUpdate` - once per target status: the audit records *which*
//!   status was last announced, so re-saving a status never re-sends but a
//!   genuine change always does
//!
//! The audit timestamp is written after the transport confirms success, as
//! a best-effort follow-up: a crash in between risks one duplicate on
//! retry, which is accepted. A transport failure leaves the audit unset so
//! a later retry can succeed.

pub mod compose;

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use solstice_core::OrderId;

use crate::config::PaymentConfig;
use crate::db::OrderRepository;
use crate::error::OrderError;
use crate::mailer::Mailer;
use crate::models::{Order, OrderItem};
use crate::payments::{self, ManualPaymentMethod};
use crate::spot::SpotPriceSource;

/// The three transactional email categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCategory {
    Receipt,
    PaymentInstructions,
    StatusUpdate,
}

/// What happened to a send request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SendOutcome {
    /// The transport confirmed delivery; the audit was written after.
    Sent,
    /// The relevant audit was already set; nothing composed, no external
    /// call made.
    AlreadySent,
    /// No transport configured - expected in local/staging environments,
    /// not an error.
    SkippedNoProvider,
    /// The transport was configured but the call errored. The audit stays
    /// unset so a retry can succeed.
    Failed,
}

/// Sends order lifecycle emails with per-category send-once auditing.
#[derive(Clone)]
pub struct Notifier {
    pool: PgPool,
    mailer: Option<Arc<dyn Mailer>>,
    spot: Arc<dyn SpotPriceSource>,
    payment: PaymentConfig,
    base_url: String,
}

impl Notifier {
    /// Create a notifier. `mailer = None` means no provider is configured;
    /// every send will report [`SendOutcome::SkippedNoProvider`].
    #[must_use]
    pub fn new(
        pool: PgPool,
        mailer: Option<Arc<dyn Mailer>>,
        spot: Arc<dyn SpotPriceSource>,
        payment: PaymentConfig,
        base_url: &str,
    ) -> Self {
        Self {
            pool,
            mailer,
            spot,
            payment,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send the email in `category` for an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order does not exist and
    /// `OrderError::Repository` if loading it fails. Transport problems are
    /// reported through the outcome, never as errors - the order is the
    /// source of truth and the email a best-effort courtesy.
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        category: EmailCategory,
        order_id: OrderId,
    ) -> Result<SendOutcome, OrderError> {
        let repo = OrderRepository::new(&self.pool);
        let order = repo.get(order_id).await?.ok_or(OrderError::OrderNotFound)?;
        let items = repo.items(order_id).await?;

        let outcome = self.deliver(&order, &items, category).await;

        if outcome == SendOutcome::Sent {
            // Best-effort, non-transactional: transport success has already
            // happened, so an audit failure only risks one duplicate later.
            if let Err(e) = repo.mark_email_sent(order_id, category, Some(order.status)).await {
                tracing::warn!(order_id = %order_id, error = %e, "could not persist email audit");
            }
        }

        Ok(outcome)
    }

    /// The audit-check / compose / transport sequence, on already-loaded
    /// data. Does not touch the database.
    async fn deliver(
        &self,
        order: &Order,
        items: &[OrderItem],
        category: EmailCategory,
    ) -> SendOutcome {
        if already_sent(order, category) {
            return SendOutcome::AlreadySent;
        }

        let Some(mailer) = &self.mailer else {
            tracing::warn!(order_id = %order.id, "email transport not configured, skipping send");
            return SendOutcome::SkippedNoProvider;
        };

        let composed = match category {
            EmailCategory::Receipt => {
                let methods = self.pending_methods(order).await;
                compose::receipt(order, items, &methods, &self.base_url)
            }
            EmailCategory::PaymentInstructions => {
                let methods = self.quote_methods(order).await;
                compose::payment_instructions(order, &methods, &self.base_url)
            }
            EmailCategory::StatusUpdate => {
                let methods = self.pending_methods(order).await;
                compose::status_update(order, items, &methods, &self.base_url)
            }
        };

        let composed = match composed {
            Ok(composed) => composed,
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "email template failed to render");
                return SendOutcome::Failed;
            }
        };

        match mailer
            .send(&order.email, &composed.subject, &composed.html, &composed.text)
            .await
        {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "failed to send email");
                SendOutcome::Failed
            }
        }
    }

    /// Payment methods with a live quote, for the instructions email.
    async fn quote_methods(&self, order: &Order) -> Vec<ManualPaymentMethod> {
        payments::methods_with_quote(&self.payment, self.spot.as_ref(), order.id, order.total_cents)
            .await
    }

    /// Payment methods for the receipt: only pending orders carry the
    /// block; a receipt retried after payment leaves it out.
    async fn pending_methods(&self, order: &Order) -> Vec<ManualPaymentMethod> {
        if order.status == solstice_core::OrderStatus::Pending {
            self.quote_methods(order).await
        } else {
            Vec::new()
        }
    }
}

/// Purely local audit check, evaluated before composing anything.
fn already_sent(order: &Order, category: EmailCategory) -> bool {
    match category {
        EmailCategory::Receipt => order.receipt_email_sent_at.is_some(),
        EmailCategory::PaymentInstructions => order.payment_email_sent_at.is_some(),
        EmailCategory::StatusUpdate => order.status_email_for == Some(order.status),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    use solstice_core::{OrderItemId, OrderStatus, PaymentMethod};

    use crate::mailer::EmailError;
    use crate::spot::FixedSpotPrice;

    pub(crate) fn order_fixture(status: OrderStatus) -> Order {
        Order {
            id: "3f2a9c01-5b1d-4e6f-8a90-123456789abc".parse().expect("uuid"),
            customer_id: None,
            email: "customer@example.com".to_string(),
            phone: None,
            shipping_name: "Ada Lovelace".to_string(),
            shipping_address1: "1 Analytical Way".to_string(),
            shipping_address2: None,
            shipping_city: "London".to_string(),
            shipping_state: "LN".to_string(),
            shipping_zip: "12345".to_string(),
            shipping_country: "US".to_string(),
            payment_method: PaymentMethod::Zelle,
            status,
            subtotal_cents: 13_800,
            total_cents: 13_800,
            mail_service: None,
            tracking_number: None,
            shipped_at: None,
            receipt_email_sent_at: None,
            payment_email_sent_at: None,
            status_email_sent_at: None,
            status_email_for: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn items_fixture(order_id: OrderId) -> Vec<OrderItem> {
        vec![OrderItem {
            id: OrderItemId::generate(),
            order_id,
            product_slug: "bpc-157-10mg".to_string(),
            product_name: "BPC-157".to_string(),
            variant_label: "10mg".to_string(),
            qty: 2,
            unit_price_cents: 6900,
            line_total_cents: 13_800,
        }]
    }

    struct MockMailer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockMailer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(
            &self,
            _to: &str,
            _subject: &str,
            _html: &str,
            _text: &str,
        ) -> Result<(), EmailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EmailError::InvalidAddress("forced failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn notifier(mailer: Option<Arc<dyn Mailer>>) -> Notifier {
        // connect_lazy never opens a connection; deliver() does not touch
        // the database at all.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/solstice_test")
            .expect("lazy pool");

        Notifier::new(
            pool,
            mailer,
            Arc::new(FixedSpotPrice(None)),
            PaymentConfig::from_env(),
            "https://solsticelabs.dev/",
        )
    }

    #[tokio::test]
    async fn test_receipt_sends_then_short_circuits() {
        let mailer = MockMailer::new(false);
        let notifier = notifier(Some(mailer.clone()));
        let mut order = order_fixture(OrderStatus::Pending);
        let items = items_fixture(order.id);

        let outcome = notifier.deliver(&order, &items, EmailCategory::Receipt).await;
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(mailer.call_count(), 1);

        // Second attempt with the audit set: no compose, no transport call.
        order.receipt_email_sent_at = Some(Utc::now());
        let outcome = notifier.deliver(&order, &items, EmailCategory::Receipt).await;
        assert_eq!(outcome, SendOutcome::AlreadySent);
        assert_eq!(mailer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_provider_skips_without_raising() {
        let notifier = notifier(None);
        let order = order_fixture(OrderStatus::Pending);
        let items = items_fixture(order.id);

        let outcome = notifier.deliver(&order, &items, EmailCategory::Receipt).await;
        assert_eq!(outcome, SendOutcome::SkippedNoProvider);
    }

    #[tokio::test]
    async fn test_transport_failure_reports_failed() {
        let mailer = MockMailer::new(true);
        let notifier = notifier(Some(mailer.clone()));
        let order = order_fixture(OrderStatus::Pending);
        let items = items_fixture(order.id);

        let outcome = notifier.deliver(&order, &items, EmailCategory::Receipt).await;
        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(mailer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_status_update_resends_only_for_new_status() {
        let mailer = MockMailer::new(false);
        let notifier = notifier(Some(mailer.clone()));
        let items = Vec::new();

        // Pending already announced: suppressed.
        let mut order = order_fixture(OrderStatus::Pending);
        order.status_email_sent_at = Some(Utc::now());
        order.status_email_for = Some(OrderStatus::Pending);
        let outcome = notifier.deliver(&order, &items, EmailCategory::StatusUpdate).await;
        assert_eq!(outcome, SendOutcome::AlreadySent);
        assert_eq!(mailer.call_count(), 0);

        // Same audit, but the order has since moved to paid: announce it.
        order.status = OrderStatus::Paid;
        let outcome = notifier.deliver(&order, &items, EmailCategory::StatusUpdate).await;
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(mailer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_payment_instructions_independent_of_receipt_audit() {
        let mailer = MockMailer::new(false);
        let notifier = notifier(Some(mailer.clone()));
        let mut order = order_fixture(OrderStatus::Pending);
        order.receipt_email_sent_at = Some(Utc::now());
        let items = items_fixture(order.id);

        let outcome = notifier
            .deliver(&order, &items, EmailCategory::PaymentInstructions)
            .await;
        assert_eq!(outcome, SendOutcome::Sent);
    }
}
