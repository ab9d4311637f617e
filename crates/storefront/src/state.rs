//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use solstice_orders::mailer::{Mailer, SmtpMailer};
use solstice_orders::notify::Notifier;
use solstice_orders::spot::{CoinbaseSpotPrice, SpotPriceSource};

use crate::config::StorefrontConfig;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    notifier: Notifier,
    spot: Arc<dyn SpotPriceSource>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay or HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let mailer: Option<Arc<dyn Mailer>> = match &config.smtp {
            Some(smtp) => Some(Arc::new(SmtpMailer::new(smtp)?)),
            None => None,
        };
        let spot: Arc<dyn SpotPriceSource> = Arc::new(CoinbaseSpotPrice::new(&config.spot)?);

        let notifier = Notifier::new(
            pool.clone(),
            mailer,
            spot.clone(),
            config.payment.clone(),
            &config.base_url,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, notifier, spot }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the notification dispatcher.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Get a reference to the BTC spot-price source.
    #[must_use]
    pub fn spot(&self) -> &dyn SpotPriceSource {
        self.inner.spot.as_ref()
    }
}
