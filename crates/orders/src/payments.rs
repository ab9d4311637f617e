//! Manual payment method generation.
//!
//! A derived view, recomputed on every request and never persisted: one
//! entry per fixed channel, each carrying the operator's destination, a
//! deep link where the channel supports one, and - for Bitcoin - a live
//! conversion of the order total at the current spot rate.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use solstice_core::{OrderId, PaymentMethod, cents_to_amount, format_usd_cents};

use crate::config::PaymentConfig;
use crate::spot::SpotPriceSource;

/// Decimal places shown for BTC amounts.
const BTC_DECIMALS: u32 = 8;

/// One manual payment channel, rendered for a specific order.
#[derive(Debug, Clone, Serialize)]
pub struct ManualPaymentMethod {
    pub method: PaymentMethod,
    pub title: &'static str,
    pub destination_label: &'static str,
    pub destination_value: String,
    /// Pre-filled deep link; `None` for copy-paste-only channels.
    pub payment_url: Option<String>,
    pub note: String,
    /// BTC amount to send, 8 decimal places; `None` when no trustworthy
    /// quote was available.
    pub bitcoin_amount: Option<String>,
    /// The USD/BTC rate the amount was computed at, echoed for
    /// transparency, e.g. `50,000.00`.
    pub bitcoin_rate_usd: Option<String>,
}

/// Deterministic short memo for an order. The same order always yields the
/// same memo across retries; operators reconcile incoming payments by it.
#[must_use]
pub fn order_memo(order_id: OrderId) -> String {
    let prefix: String = order_id.to_string().chars().take(8).collect();
    format!("Solstice {prefix}")
}

/// Build the four payment methods for an order.
///
/// `rate` is the USD/BTC spot rate, already validated by the source;
/// `None` keeps the Bitcoin method in the list but marks its amount
/// unavailable - the channel is never omitted, and the amount is never
/// silently zero.
#[must_use]
pub fn methods(
    config: &PaymentConfig,
    order_id: OrderId,
    total_cents: i64,
    rate: Option<Decimal>,
) -> Vec<ManualPaymentMethod> {
    let amount = cents_to_amount(total_cents);
    let memo = order_memo(order_id);

    let btc_amount = rate
        .filter(|r| r > &Decimal::ZERO)
        .map(|r| btc_from_cents(total_cents, r));
    let btc_rate_label = rate
        .filter(|r| r > &Decimal::ZERO)
        .map(format_rate_label);

    vec![
        ManualPaymentMethod {
            method: PaymentMethod::Cashapp,
            title: PaymentMethod::Cashapp.title(),
            destination_label: "Cash App tag",
            destination_value: config.cashapp_tag.clone(),
            payment_url: Some(format!("https://cash.app/{}/{amount}", config.cashapp_tag)),
            note: "Tap to open Cash App. Amount is pre-filled.".to_string(),
            bitcoin_amount: None,
            bitcoin_rate_usd: None,
        },
        ManualPaymentMethod {
            method: PaymentMethod::Venmo,
            title: PaymentMethod::Venmo.title(),
            destination_label: "Venmo handle",
            destination_value: config.venmo_handle.clone(),
            payment_url: Some(format!(
                "https://venmo.com/{}?txn=pay&amount={amount}&note={}",
                urlencoding::encode(config.venmo_handle_path()),
                urlencoding::encode(&memo),
            )),
            note: "Tap to open Venmo. Amount and memo are pre-filled.".to_string(),
            bitcoin_amount: None,
            bitcoin_rate_usd: None,
        },
        ManualPaymentMethod {
            method: PaymentMethod::Zelle,
            title: PaymentMethod::Zelle.title(),
            destination_label: "Zelle recipient",
            destination_value: config.zelle_recipient.clone(),
            payment_url: None,
            note: "Copy recipient and add your Order ID in the memo.".to_string(),
            bitcoin_amount: None,
            bitcoin_rate_usd: None,
        },
        ManualPaymentMethod {
            method: PaymentMethod::Bitcoin,
            title: PaymentMethod::Bitcoin.title(),
            destination_label: "BTC address",
            destination_value: config.btc_address.clone(),
            payment_url: None,
            note: btc_amount.as_ref().map_or_else(
                || {
                    "BTC quote temporarily unavailable. Please check with support for exact amount before sending."
                        .to_string()
                },
                |amount| format!("Send exactly {amount} BTC for this order (network fee is separate)."),
            ),
            bitcoin_amount: btc_amount,
            bitcoin_rate_usd: btc_rate_label,
        },
    ]
}

/// Build the methods for an order, looking up the live spot rate first.
pub async fn methods_with_quote(
    config: &PaymentConfig,
    spot: &dyn SpotPriceSource,
    order_id: OrderId,
    total_cents: i64,
) -> Vec<ManualPaymentMethod> {
    let rate = spot.usd_per_btc().await;
    methods(config, order_id, total_cents, rate)
}

/// Convert integer USD cents to a BTC amount string at `rate` USD/BTC.
fn btc_from_cents(total_cents: i64, rate: Decimal) -> String {
    let usd = Decimal::new(total_cents.max(0), 2);
    let btc = (usd / rate).round_dp_with_strategy(BTC_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{btc:.8}")
}

/// Render the rate the way the order total is rendered, minus the sign,
/// e.g. `50,000.00`.
fn format_rate_label(rate: Decimal) -> String {
    let cents = (rate * Decimal::new(100, 0)).round().to_i64().unwrap_or(i64::MAX);
    format_usd_cents(cents).trim_start_matches('$').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig {
            cashapp_tag: "$solsticelabs".to_string(),
            venmo_handle: "@Solstice-Labs".to_string(),
            zelle_recipient: "pay@solsticelabs.dev".to_string(),
            btc_address: "bc1qml59pmh6ae0jmtdq7e5yc6pkcvmy3a30ph7gvq".to_string(),
        }
    }

    fn order_id() -> OrderId {
        "3f2a9c01-5b1d-4e6f-8a90-123456789abc".parse().expect("uuid")
    }

    #[test]
    fn test_memo_is_deterministic() {
        assert_eq!(order_memo(order_id()), "Solstice 3f2a9c01");
        assert_eq!(order_memo(order_id()), order_memo(order_id()));
    }

    #[test]
    fn test_four_channels_in_presentation_order() {
        let methods = methods(&config(), order_id(), 10_000, None);
        let order: Vec<PaymentMethod> = methods.iter().map(|m| m.method).collect();
        assert_eq!(order, PaymentMethod::ALL);
    }

    #[test]
    fn test_deep_links_carry_amount_and_memo() {
        let methods = methods(&config(), order_id(), 12_345, None);

        let cashapp = &methods[0];
        assert_eq!(
            cashapp.payment_url.as_deref(),
            Some("https://cash.app/$solsticelabs/123.45")
        );

        let venmo = &methods[1];
        let url = venmo.payment_url.as_deref().expect("venmo deep link");
        assert!(url.starts_with("https://venmo.com/Solstice-Labs?txn=pay&amount=123.45"));
        assert!(url.contains("note=Solstice%203f2a9c01"));

        // Zelle and Bitcoin are copy-paste only
        assert!(methods[2].payment_url.is_none());
        assert!(methods[3].payment_url.is_none());
    }

    #[test]
    fn test_btc_amount_at_known_rate() {
        // $100.00 at $50,000.00/BTC is exactly 0.00200000 BTC
        let rate = Some(Decimal::new(50_000, 0));
        let methods = methods(&config(), order_id(), 10_000, rate);

        let bitcoin = &methods[3];
        assert_eq!(bitcoin.bitcoin_amount.as_deref(), Some("0.00200000"));
        assert_eq!(bitcoin.bitcoin_rate_usd.as_deref(), Some("50,000.00"));
        assert!(bitcoin.note.contains("0.00200000 BTC"));
    }

    #[test]
    fn test_btc_amount_rounds_to_eight_places() {
        // $79.00 at $43,211.57/BTC = 0.0018282140... BTC
        let rate = Some("43211.57".parse::<Decimal>().expect("decimal"));
        let methods = methods(&config(), order_id(), 7900, rate);
        assert_eq!(methods[3].bitcoin_amount.as_deref(), Some("0.00182821"));
    }

    #[test]
    fn test_btc_method_survives_missing_quote() {
        let methods = methods(&config(), order_id(), 10_000, None);
        let bitcoin = &methods[3];
        assert_eq!(bitcoin.method, PaymentMethod::Bitcoin);
        assert!(bitcoin.bitcoin_amount.is_none());
        assert!(bitcoin.bitcoin_rate_usd.is_none());
        assert!(bitcoin.note.contains("check with support"));
    }

    #[test]
    fn test_btc_method_treats_non_positive_rate_as_unavailable() {
        let methods = methods(&config(), order_id(), 10_000, Some(Decimal::ZERO));
        assert!(methods[3].bitcoin_amount.is_none());
    }
}
