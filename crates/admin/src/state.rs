//! Application state shared across admin handlers.

use std::sync::Arc;

use sqlx::PgPool;

use solstice_orders::mailer::{Mailer, SmtpMailer};
use solstice_orders::notify::Notifier;
use solstice_orders::spot::{CoinbaseSpotPrice, SpotPriceSource};

use crate::config::AdminConfig;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application state shared across all admin handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay or HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let mailer: Option<Arc<dyn Mailer>> = match &config.smtp {
            Some(smtp) => Some(Arc::new(SmtpMailer::new(smtp)?)),
            None => None,
        };
        let spot: Arc<dyn SpotPriceSource> = Arc::new(CoinbaseSpotPrice::new(&config.spot)?);

        let notifier = Notifier::new(
            pool.clone(),
            mailer,
            spot,
            config.payment.clone(),
            &config.storefront_base_url,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, notifier }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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
}
