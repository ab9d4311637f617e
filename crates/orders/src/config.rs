//! Component configuration for the order pipeline.
//!
//! The binaries own their server configuration (bind address, database URL,
//! session secret); the pieces the pipeline itself needs - payment
//! destinations, SMTP credentials, the spot-price endpoint - are loaded
//! here so storefront and admin configure them identically.
//!
//! # Environment Variables
//!
//! ## Payment destinations (all optional, with demo defaults)
//! - `CASHAPP_TAG` - Cash App cashtag, `$` prefix optional
//! - `VENMO_HANDLE` - Venmo handle, `@` prefix optional
//! - `ZELLE_RECIPIENT` - Zelle recipient email or phone
//! - `BTC_ADDRESS` - Bitcoin receiving address
//!
//! ## Email (notification sending is skipped unless all are set)
//! - `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`
//! - `SMTP_PORT` - default 587
//! - `EMAIL_FROM` - From address, default `Solstice Labs <orders@solsticelabs.dev>`
//!
//! ## Spot price
//! - `BTC_SPOT_URL` - default Coinbase spot endpoint
//! - `BTC_SPOT_TIMEOUT_MS` - default 2500

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Operator-supplied destinations for the four manual payment channels.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Cash App cashtag, normalized to a leading `$`.
    pub cashapp_tag: String,
    /// Venmo handle as displayed, e.g. `@SolsticeLabs`.
    pub venmo_handle: String,
    /// Zelle recipient (email or phone).
    pub zelle_recipient: String,
    /// Bitcoin receiving address.
    pub btc_address: String,
}

impl PaymentConfig {
    /// Load payment destinations from the environment, falling back to the
    /// demo destinations used in local development.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cashapp_tag: normalize_cashapp_tag(&get_env_or_default(
                "CASHAPP_TAG",
                "$solsticelabs",
            )),
            venmo_handle: get_env_or_default("VENMO_HANDLE", "@SolsticeLabs")
                .trim()
                .to_string(),
            zelle_recipient: get_env_or_default("ZELLE_RECIPIENT", "pay@solsticelabs.dev")
                .trim()
                .to_string(),
            btc_address: get_env_or_default(
                "BTC_ADDRESS",
                "bc1qml59pmh6ae0jmtdq7e5yc6pkcvmy3a30ph7gvq",
            )
            .trim()
            .to_string(),
        }
    }

    /// Venmo handle without the `@`, for URL paths.
    #[must_use]
    pub fn venmo_handle_path(&self) -> &str {
        self.venmo_handle.trim_start_matches('@')
    }
}

/// SMTP transport configuration. `None` when the environment does not
/// configure a provider; the notifier then reports `skipped-no-provider`
/// instead of raising, which is the expected local/staging setup.
#[derive(Clone)]
pub struct SmtpConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl SmtpConfig {
    /// Load SMTP configuration from the environment.
    ///
    /// Returns `Ok(None)` when `SMTP_HOST`/`SMTP_USERNAME`/`SMTP_PASSWORD`
    /// are not all present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `SMTP_PORT` is not a number.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(smtp_host), Some(smtp_username), Some(smtp_password)) = (
            get_optional_env("SMTP_HOST"),
            get_optional_env("SMTP_USERNAME"),
            get_optional_env("SMTP_PASSWORD"),
        ) else {
            return Ok(None);
        };

        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password: SecretString::from(smtp_password),
            from_address: get_env_or_default(
                "EMAIL_FROM",
                "Solstice Labs <orders@solsticelabs.dev>",
            ),
        }))
    }
}

/// Spot-price lookup configuration.
#[derive(Debug, Clone)]
pub struct SpotPriceConfig {
    /// Endpoint returning the USD spot price of one BTC.
    pub url: String,
    /// Hard timeout for the lookup; on expiry the quote degrades to
    /// "amount unavailable" rather than blocking the render.
    pub timeout_ms: u64,
}

impl SpotPriceConfig {
    /// Load spot-price configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `BTC_SPOT_TIMEOUT_MS` is not
    /// a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms = get_env_or_default("BTC_SPOT_TIMEOUT_MS", "2500")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BTC_SPOT_TIMEOUT_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            url: get_env_or_default(
                "BTC_SPOT_URL",
                "https://api.coinbase.com/v2/prices/spot?currency=USD",
            ),
            timeout_ms,
        })
    }
}

/// Normalize a cashtag to a single leading `$`.
fn normalize_cashapp_tag(tag: &str) -> String {
    let trimmed: String = tag.split_whitespace().collect();
    if trimmed.is_empty() {
        return "$solsticelabs".to_string();
    }
    if trimmed.starts_with('$') {
        trimmed
    } else {
        format!("${trimmed}")
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cashapp_tag() {
        assert_eq!(normalize_cashapp_tag("$solsticelabs"), "$solsticelabs");
        assert_eq!(normalize_cashapp_tag("solsticelabs"), "$solsticelabs");
        assert_eq!(normalize_cashapp_tag("  sol stice  "), "$solstice");
        assert_eq!(normalize_cashapp_tag(""), "$solsticelabs");
    }

    #[test]
    fn test_venmo_handle_path_strips_at() {
        let config = PaymentConfig {
            cashapp_tag: "$x".to_string(),
            venmo_handle: "@SolsticeLabs".to_string(),
            zelle_recipient: "pay@solsticelabs.dev".to_string(),
            btc_address: "bc1q".to_string(),
        };
        assert_eq!(config.venmo_handle_path(), "SolsticeLabs");
    }
}
