//! Order commit engine.
//!
//! Takes validated cart lines plus customer/shipping data and turns them
//! into a durable order inside one all-or-nothing transaction: conditional
//! inventory decrements first, then the order and item rows, then the
//! signed-in customer's profile refresh. Any failure rolls back every
//! write - inventory is never spent against a failed order.

use std::collections::HashMap;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use solstice_core::{OrderId, PaymentMethod, UserId};

use crate::db::orders::{NewOrder, NewOrderItem, insert_items, insert_order};
use crate::db::overrides::{conditional_decrement, stored_inventory};
use crate::db::users::{AddressFields, update_profile, upsert_default_address};
use crate::error::OrderError;
use crate::pricing::{self, ResolvedProduct};

/// Hard per-line quantity cap.
pub const MAX_QTY_PER_LINE: i32 = 99;

/// One cart line as submitted by the client. Lines are never coalesced:
/// two lines for the same slug are priced and reserved independently, in
/// submission order.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub slug: String,
    pub qty: i32,
}

/// A checkout submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub shipping_name: String,
    pub shipping_address1: String,
    #[serde(default)]
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    #[serde(default)]
    pub shipping_country: Option<String>,
    pub payment_method: PaymentMethod,
}

/// A cart line after resolution: snapshot identity plus the frozen price
/// actually charged.
#[derive(Debug, Clone)]
struct ComputedLine {
    slug: String,
    qty: i32,
    name: &'static str,
    variant_label: &'static str,
    unit_price_cents: i64,
    line_total_cents: i64,
    effective_inventory: Option<i32>,
}

/// Commit a checkout. Returns the new order id.
///
/// # Errors
///
/// - `OrderError::InvalidInput` for malformed request data (rejected
///   before any write)
/// - `OrderError::UnknownProduct` for a slug not in the catalog
/// - `OrderError::OutOfStock` when a conditional decrement finds fewer
///   units than requested; the whole transaction is rolled back
/// - `OrderError::Repository` for storage failures (also rolled back)
#[instrument(skip(pool, request), fields(lines = request.lines.len()))]
pub async fn commit(
    pool: &PgPool,
    customer_id: Option<UserId>,
    request: &CheckoutRequest,
) -> Result<OrderId, OrderError> {
    validate(request)?;

    let mut unique_slugs: Vec<String> = request.lines.iter().map(|l| l.slug.clone()).collect();
    unique_slugs.sort_unstable();
    unique_slugs.dedup();

    let resolved = pricing::resolve(pool, &unique_slugs).await?;
    let lines = compute_lines(&request.lines, &resolved)?;
    let subtotal_cents: i64 = lines.iter().map(|l| l.line_total_cents).sum();
    // No tax or shipping surcharge in the current design.
    let total_cents = subtotal_cents;

    let email = request.email.trim().to_lowercase();
    let phone = normalize_optional(request.phone.as_deref());
    let address2 = normalize_optional(request.shipping_address2.as_deref());
    let country = request
        .shipping_country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("US")
        .to_uppercase();

    let mut tx = pool.begin().await?;

    // Reserve inventory, line by line, only for finite-inventory products.
    // A failed decrement aborts the whole order; dropping the transaction
    // rolls back every decrement already applied.
    for line in &lines {
        if line.effective_inventory.is_none() {
            continue;
        }

        if !conditional_decrement(&mut tx, &line.slug, line.qty).await? {
            let available = stored_inventory(&mut tx, &line.slug)
                .await?
                .unwrap_or(0);
            tx.rollback().await?;
            tracing::info!(slug = %line.slug, requested = line.qty, available, "checkout lost inventory race");
            return Err(OrderError::OutOfStock {
                name: line.name.to_string(),
                variant_label: line.variant_label.to_string(),
                requested: line.qty,
                available,
            });
        }
    }

    let order_id = insert_order(
        &mut tx,
        &NewOrder {
            customer_id,
            email,
            phone: phone.clone(),
            shipping_name: request.shipping_name.trim().to_string(),
            shipping_address1: request.shipping_address1.trim().to_string(),
            shipping_address2: address2.clone(),
            shipping_city: request.shipping_city.trim().to_string(),
            shipping_state: request.shipping_state.trim().to_string(),
            shipping_zip: request.shipping_zip.trim().to_string(),
            shipping_country: country.clone(),
            payment_method: request.payment_method,
            subtotal_cents,
            total_cents,
        },
    )
    .await?;

    let new_items: Vec<NewOrderItem> = lines
        .iter()
        .map(|l| NewOrderItem {
            product_slug: l.slug.clone(),
            product_name: l.name.to_string(),
            variant_label: l.variant_label.to_string(),
            qty: l.qty,
            unit_price_cents: l.unit_price_cents,
            line_total_cents: l.line_total_cents,
        })
        .collect();
    insert_items(&mut tx, order_id, &new_items).await?;

    // Convenience write for signed-in customers: refresh profile and the
    // single default address. Kept inside the transaction so a failure
    // here cannot strand an order whose inventory decrement survived.
    if let Some(user_id) = customer_id {
        let name = request.shipping_name.trim();
        if !name.is_empty() || phone.is_some() {
            update_profile(&mut tx, user_id, name, phone.as_deref()).await?;
        }

        upsert_default_address(
            &mut tx,
            user_id,
            &AddressFields {
                name: Some(name).filter(|n| !n.is_empty()),
                phone: phone.as_deref(),
                address1: request.shipping_address1.trim(),
                address2: address2.as_deref(),
                city: request.shipping_city.trim(),
                state: request.shipping_state.trim(),
                zip: request.shipping_zip.trim(),
                country: &country,
            },
        )
        .await?;
    }

    tx.commit().await?;
    tracing::info!(order_id = %order_id, subtotal_cents, "order committed");

    Ok(order_id)
}

/// Reject malformed request data before any resolution or write.
fn validate(request: &CheckoutRequest) -> Result<(), OrderError> {
    if request.lines.is_empty() {
        return Err(OrderError::InvalidInput("cart is empty".to_string()));
    }

    for line in &request.lines {
        if line.slug.trim().is_empty() {
            return Err(OrderError::InvalidInput("missing product slug".to_string()));
        }
        if line.qty < 1 || line.qty > MAX_QTY_PER_LINE {
            return Err(OrderError::InvalidInput(format!(
                "quantity for {} must be between 1 and {MAX_QTY_PER_LINE}",
                line.slug
            )));
        }
    }

    let email = request.email.trim();
    if email.len() < 3 || !email.contains('@') || email.contains(char::is_whitespace) {
        return Err(OrderError::InvalidInput("invalid email address".to_string()));
    }

    if let Some(phone) = &request.phone {
        let phone = phone.trim();
        if !phone.is_empty() && (phone.len() < 5 || phone.len() > 32) {
            return Err(OrderError::InvalidInput(
                "phone must be between 5 and 32 characters".to_string(),
            ));
        }
    }

    check_len("shipping name", &request.shipping_name, 2, 128)?;
    check_len("shipping address", &request.shipping_address1, 3, 128)?;
    if let Some(address2) = &request.shipping_address2
        && address2.trim().len() > 128
    {
        return Err(OrderError::InvalidInput(
            "shipping address line 2 must be at most 128 characters".to_string(),
        ));
    }
    check_len("city", &request.shipping_city, 2, 64)?;
    check_len("state", &request.shipping_state, 2, 64)?;
    check_len("zip", &request.shipping_zip, 3, 16)?;

    if let Some(country) = &request.shipping_country {
        let country = country.trim();
        if !country.is_empty() && country.len() != 2 {
            return Err(OrderError::InvalidInput(
                "country must be a 2-letter code".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), OrderError> {
    let len = value.trim().len();
    if len < min || len > max {
        return Err(OrderError::InvalidInput(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Price every line against the resolution snapshot and pre-check each line
/// against its effective inventory. The authoritative stock check is the
/// conditional decrement inside the transaction; this early check exists to
/// give the customer exact requested/available numbers without opening a
/// transaction that cannot succeed.
fn compute_lines(
    lines: &[CartLine],
    resolved: &HashMap<String, ResolvedProduct>,
) -> Result<Vec<ComputedLine>, OrderError> {
    lines
        .iter()
        .map(|line| {
            let product = resolved.get(&line.slug).ok_or_else(|| {
                // resolve() already rejected unknown slugs; a miss here is a bug
                OrderError::UnknownProduct { slug: line.slug.clone() }
            })?;

            if let Some(available) = product.effective_inventory
                && line.qty > available
            {
                return Err(OrderError::OutOfStock {
                    name: product.name.to_string(),
                    variant_label: product.variant_label.to_string(),
                    requested: line.qty,
                    available,
                });
            }

            Ok(ComputedLine {
                slug: line.slug.clone(),
                qty: line.qty,
                name: product.name,
                variant_label: product.variant_label,
                unit_price_cents: product.effective_price_cents,
                line_total_cents: product.effective_price_cents * i64::from(line.qty),
                effective_inventory: product.effective_inventory,
            })
        })
        .collect()
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
