//! Repository for orders and their line items.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use solstice_core::{OrderId, OrderStatus, PaymentMethod, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};
use crate::notify::EmailCategory;

/// Column values for a new order row. Totals are computed by the commit
/// engine; the repository only persists them.
pub struct NewOrder {
    pub customer_id: Option<UserId>,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_name: String,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

/// Column values for a new line item: the product snapshot plus the frozen
/// unit price actually charged.
pub struct NewOrderItem {
    pub product_slug: String,
    pub product_name: String,
    pub variant_label: String,
    pub qty: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Field changes produced by a validated status transition. Applied as one
/// UPDATE so status and shipment fields can never drift apart.
#[derive(Debug)]
pub struct StatusPatch {
    pub status: OrderStatus,
    pub mail_service: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    /// Confirmed channel when entering `paid`; `None` leaves the stored
    /// payment method untouched.
    pub payment_method: Option<PaymentMethod>,
}

const ORDER_COLUMNS: &str = r"
    id, customer_id, email, phone,
    shipping_name, shipping_address1, shipping_address2,
    shipping_city, shipping_state, shipping_zip, shipping_country,
    payment_method, status, subtotal_cents, total_cents,
    mail_service, tracking_number, shipped_at,
    receipt_email_sent_at, payment_email_sent_at,
    status_email_sent_at, status_email_for,
    created_at
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Get the line items for an order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_slug, product_name, variant_label,
                   qty, unit_price_cents, line_total_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY position
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// List the most recent orders for the admin overview.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Apply a validated status patch and return the updated order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn apply_status_patch(
        &self,
        id: OrderId,
        patch: &StatusPatch,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r"
            UPDATE orders
            SET status = $2,
                mail_service = $3,
                tracking_number = $4,
                shipped_at = $5,
                payment_method = COALESCE($6, payment_method)
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.status)
        .bind(patch.mail_service.as_deref())
        .bind(patch.tracking_number.as_deref())
        .bind(patch.shipped_at)
        .bind(patch.payment_method)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(order)
    }

    /// Record that an email in `category` has been sent.
    ///
    /// Best-effort follow-up to a successful transport call; the caller
    /// logs (and tolerates) a failure here rather than failing the send.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_email_sent(
        &self,
        id: OrderId,
        category: EmailCategory,
        announced: Option<OrderStatus>,
    ) -> Result<(), RepositoryError> {
        let sql = match category {
            EmailCategory::Receipt => {
                "UPDATE orders SET receipt_email_sent_at = now() WHERE id = $1"
            }
            EmailCategory::PaymentInstructions => {
                "UPDATE orders SET payment_email_sent_at = now() WHERE id = $1"
            }
            EmailCategory::StatusUpdate => {
                "UPDATE orders SET status_email_sent_at = now(), status_email_for = $2 WHERE id = $1"
            }
        };

        let mut query = sqlx::query(sql).bind(id);
        if matches!(category, EmailCategory::StatusUpdate) {
            query = query.bind(announced);
        }
        query.execute(self.pool).await?;

        Ok(())
    }
}

/// Insert the order row inside the commit transaction and return its id.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    new_order: &NewOrder,
) -> Result<OrderId, RepositoryError> {
    let id: OrderId = sqlx::query_scalar(
        r"
        INSERT INTO orders (
            customer_id, email, phone,
            shipping_name, shipping_address1, shipping_address2,
            shipping_city, shipping_state, shipping_zip, shipping_country,
            payment_method, status, subtotal_cents, total_cents
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', $12, $13)
        RETURNING id
        ",
    )
    .bind(new_order.customer_id)
    .bind(&new_order.email)
    .bind(new_order.phone.as_deref())
    .bind(&new_order.shipping_name)
    .bind(&new_order.shipping_address1)
    .bind(new_order.shipping_address2.as_deref())
    .bind(&new_order.shipping_city)
    .bind(&new_order.shipping_state)
    .bind(&new_order.shipping_zip)
    .bind(&new_order.shipping_country)
    .bind(new_order.payment_method)
    .bind(new_order.subtotal_cents)
    .bind(new_order.total_cents)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Insert the line items for a freshly inserted order, in submission order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[NewOrderItem],
) -> Result<(), RepositoryError> {
    for (position, item) in (0i32..).zip(items) {
        sqlx::query(
            r"
            INSERT INTO order_items (
                order_id, position, product_slug, product_name, variant_label,
                qty, unit_price_cents, line_total_cents
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(order_id)
        .bind(position)
        .bind(&item.product_slug)
        .bind(&item.product_name)
        .bind(&item.variant_label)
        .bind(item.qty)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
