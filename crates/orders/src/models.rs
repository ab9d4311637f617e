//! Persistent row types for the order pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solstice_core::{AddressId, OrderId, OrderItemId, OrderStatus, PaymentMethod, UserId};

/// An admin price/inventory override for a catalog product.
///
/// A row with both fields null is semantically "no override" and is deleted
/// rather than stored; see `OverrideRepository::upsert`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriceOverride {
    /// Catalog slug this override applies to. At most one row per product.
    pub slug: String,
    /// Replacement price in cents, if overridden.
    pub price_cents: Option<i64>,
    /// Remaining stock. `None` means unlimited.
    pub inventory: Option<i32>,
    /// Last admin edit or inventory decrement.
    pub updated_at: DateTime<Utc>,
}

/// A committed order. Created exactly once at checkout; mutated only by the
/// status state machine; never deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    /// Signed-in customer, if any. Guest checkout leaves this null.
    pub customer_id: Option<UserId>,
    pub email: String,
    pub phone: Option<String>,

    // Shipping snapshot, copied at order time. Later address-book edits do
    // not touch committed orders.
    pub shipping_name: String,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,

    pub payment_method: PaymentMethod,
    pub status: OrderStatus,

    pub subtotal_cents: i64,
    pub total_cents: i64,

    // Shipment fields. Only meaningful while status is `shipped`.
    pub mail_service: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,

    // Per-category email audit. A set timestamp means "already sent"; the
    // status category additionally records which status it announced.
    pub receipt_email_sent_at: Option<DateTime<Utc>>,
    pub payment_email_sent_at: Option<DateTime<Utc>>,
    pub status_email_sent_at: Option<DateTime<Utc>>,
    pub status_email_for: Option<OrderStatus>,

    pub created_at: DateTime<Utc>,
}

/// A line item belonging to exactly one order. Product identity and price
/// are snapshots frozen at commit time; the row is immutable once written.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_slug: String,
    pub product_name: String,
    pub variant_label: String,
    pub qty: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A storefront user (customer or administrator).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Customer,
}

/// A customer's saved shipping address. Each customer keeps at most one
/// default address, refreshed on every signed-in checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerAddress {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
