//! Email content composition.
//!
//! Every message embeds the order id, the short order number, and a
//! line-item breakdown; pending orders additionally get the full manual
//! payment block. Bodies render from askama templates in both HTML and
//! plain text.

use askama::Template;

use solstice_core::{OrderStatus, format_usd_cents};

use crate::models::{Order, OrderItem};
use crate::payments::{ManualPaymentMethod, order_memo};

/// A rendered email, ready for the transport.
pub struct Composed {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Display row for one line item.
pub struct ItemView {
    pub name: String,
    pub qty: i32,
    pub unit_price: String,
    pub line_total: String,
}

/// Shipment details shown on a shipped-status email.
pub struct ShippingView {
    pub mail_service: String,
    pub tracking_number: String,
}

/// Payment reminder shown on a pending-status email.
pub struct PendingView {
    pub order_url: String,
    pub total: String,
    pub memo: String,
}

#[derive(Template)]
#[template(path = "email/receipt.html")]
struct ReceiptHtml<'a> {
    order_number: &'a str,
    order_id: &'a str,
    total: &'a str,
    order_url: &'a str,
    items: &'a [ItemView],
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
}

#[derive(Template)]
#[template(path = "email/receipt.txt")]
struct ReceiptText<'a> {
    order_number: &'a str,
    order_id: &'a str,
    total: &'a str,
    order_url: &'a str,
    items: &'a [ItemView],
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
}

#[derive(Template)]
#[template(path = "email/payment_instructions.html")]
struct PaymentInstructionsHtml<'a> {
    order_number: &'a str,
    order_id: &'a str,
    total: &'a str,
    order_url: &'a str,
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
}

#[derive(Template)]
#[template(path = "email/payment_instructions.txt")]
struct PaymentInstructionsText<'a> {
    order_number: &'a str,
    order_id: &'a str,
    total: &'a str,
    order_url: &'a str,
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
}

#[derive(Template)]
#[template(path = "email/status_update.html")]
struct StatusUpdateHtml<'a> {
    order_number: &'a str,
    order_id: &'a str,
    status: &'a str,
    total: &'a str,
    order_url: &'a str,
    items: &'a [ItemView],
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
    shipping: Option<&'a ShippingView>,
    pending: Option<&'a PendingView>,
}

#[derive(Template)]
#[template(path = "email/status_update.txt")]
struct StatusUpdateText<'a> {
    order_number: &'a str,
    order_id: &'a str,
    status: &'a str,
    total: &'a str,
    order_url: &'a str,
    items: &'a [ItemView],
    methods: &'a [ManualPaymentMethod],
    memo: &'a str,
    shipping: Option<&'a ShippingView>,
    pending: Option<&'a PendingView>,
}

fn item_views(items: &[OrderItem]) -> Vec<ItemView> {
    items
        .iter()
        .map(|item| ItemView {
            name: format!("{} {}", item.product_name, item.variant_label),
            qty: item.qty,
            unit_price: format_usd_cents(item.unit_price_cents),
            line_total: format_usd_cents(item.line_total_cents),
        })
        .collect()
}

fn thank_you_url(base_url: &str, order: &Order) -> String {
    format!("{base_url}/orders/{}/thank-you", order.id)
}

/// Compose the order receipt.
///
/// # Errors
///
/// Returns `askama::Error` if a template fails to render.
pub fn receipt(
    order: &Order,
    items: &[OrderItem],
    methods: &[ManualPaymentMethod],
    base_url: &str,
) -> Result<Composed, askama::Error> {
    let order_number = order.id.order_number();
    let order_id = order.id.to_string();
    let total = format_usd_cents(order.total_cents);
    let order_url = thank_you_url(base_url, order);
    let items = item_views(items);
    let memo = order_memo(order.id);

    let html = ReceiptHtml {
        order_number: &order_number,
        order_id: &order_id,
        total: &total,
        order_url: &order_url,
        items: &items,
        methods,
        memo: &memo,
    }
    .render()?;
    let text = ReceiptText {
        order_number: &order_number,
        order_id: &order_id,
        total: &total,
        order_url: &order_url,
        items: &items,
        methods,
        memo: &memo,
    }
    .render()?;

    Ok(Composed {
        subject: format!("Receipt for order #{order_number}"),
        html,
        text,
    })
}

/// Compose the standalone payment-instructions email.
///
/// # Errors
///
/// Returns `askama::Error` if a template fails to render.
pub fn payment_instructions(
    order: &Order,
    methods: &[ManualPaymentMethod],
    base_url: &str,
) -> Result<Composed, askama::Error> {
    let order_number = order.id.order_number();
    let order_id = order.id.to_string();
    let total = format_usd_cents(order.total_cents);
    let order_url = thank_you_url(base_url, order);
    let memo = order_memo(order.id);

    let html = PaymentInstructionsHtml {
        order_number: &order_number,
        order_id: &order_id,
        total: &total,
        order_url: &order_url,
        methods,
        memo: &memo,
    }
    .render()?;
    let text = PaymentInstructionsText {
        order_number: &order_number,
        order_id: &order_id,
        total: &total,
        order_url: &order_url,
        methods,
        memo: &memo,
    }
    .render()?;

    Ok(Composed {
        subject: format!("Payment instructions for order #{order_number}"),
        html,
        text,
    })
}

/// Compose the status-change announcement for the order's current status.
///
/// `methods` should be empty unless the order is pending; pending orders
/// carry the full manual-payment block so the customer can still settle.
///
/// # Errors
///
/// Returns `askama::Error` if a template fails to render.
pub fn status_update(
    order: &Order,
    items: &[OrderItem],
    methods: &[ManualPaymentMethod],
    base_url: &str,
) -> Result<Composed, askama::Error> {
    let order_number = order.id.order_number();
    let order_id = order.id.to_string();
    let status = order.status.display();
    let total = format_usd_cents(order.total_cents);
    let order_url = format!("{base_url}/orders/{}", order.id);
    let items = item_views(items);
    let memo = order_memo(order.id);

    let shipping = match (&order.mail_service, &order.tracking_number) {
        (Some(mail_service), Some(tracking_number)) if order.status == OrderStatus::Shipped => {
            Some(ShippingView {
                mail_service: mail_service.clone(),
                tracking_number: tracking_number.clone(),
            })
        }
        _ => None,
    };

    let pending = (order.status == OrderStatus::Pending).then(|| PendingView {
        order_url: thank_you_url(base_url, order),
        total: format_usd_cents(order.total_cents),
        memo: order_memo(order.id),
    });

    let html = StatusUpdateHtml {
        order_number: &order_number,
        order_id: &order_id,
        status,
        total: &total,
        order_url: &order_url,
        items: &items,
        methods,
        memo: &memo,
        shipping: shipping.as_ref(),
        pending: pending.as_ref(),
    }
    .render()?;
    let text = StatusUpdateText {
        order_number: &order_number,
        order_id: &order_id,
        status,
        total: &total,
        order_url: &order_url,
        items: &items,
        methods,
        memo: &memo,
        shipping: shipping.as_ref(),
        pending: pending.as_ref(),
    }
    .render()?;

    Ok(Composed {
        subject: format!("Order #{order_number} is now {status}"),
        html,
        text,
    })
}
