//! External BTC spot-price source.
//!
//! Each lookup is independent and uncached: the quote is allowed to be
//! stale by the time the customer pays, but it must never be silently zero
//! or reused across requests. Every failure mode - timeout, non-2xx,
//! malformed body, non-positive value - degrades to `None`, which the
//! payment layer renders as "amount unavailable, confirm with support".

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::SpotPriceConfig;

/// A source of the current USD value of one BTC.
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    /// Current USD per BTC, or `None` when no trustworthy quote is
    /// available right now.
    async fn usd_per_btc(&self) -> Option<Decimal>;
}

/// Coinbase spot-price endpoint client with a bounded per-request timeout.
pub struct CoinbaseSpotPrice {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct SpotResponse {
    data: Option<SpotData>,
}

#[derive(Deserialize)]
struct SpotData {
    amount: Option<String>,
}

impl CoinbaseSpotPrice {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &SpotPriceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, url: config.url.clone() })
    }
}

#[async_trait]
impl SpotPriceSource for CoinbaseSpotPrice {
    async fn usd_per_btc(&self) -> Option<Decimal> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "BTC spot lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "BTC spot lookup returned non-success");
            return None;
        }

        let payload: SpotResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "BTC spot response was not valid JSON");
                return None;
            }
        };

        payload
            .data
            .and_then(|d| d.amount)
            .and_then(|raw| raw.trim().parse::<Decimal>().ok())
            .filter(|rate| rate > &Decimal::ZERO)
    }
}

/// A source that always answers with a fixed rate (or `None`). Used by
/// tests and by local development without network access.
pub struct FixedSpotPrice(pub Option<Decimal>);

#[async_trait]
impl SpotPriceSource for FixedSpotPrice {
    async fn usd_per_btc(&self) -> Option<Decimal> {
        self.0.filter(|rate| rate > &Decimal::ZERO)
    }
}
