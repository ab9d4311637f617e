//! Live pricing API for the storefront UI.

use axum::{Json, extract::{Query, State}};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solstice_core::catalog::{find_product, products};
use solstice_orders::pricing::{self, PricingRow};

use crate::state::AppState;

/// Query parameters for the pricing endpoint.
#[derive(Debug, Deserialize)]
pub struct PricingParams {
    /// Comma-separated slugs; absent means the whole catalog.
    pub slugs: Option<String>,
}

/// Response body for the pricing endpoint.
#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub rows: Vec<PricingRow>,
}

/// Effective prices and inventory for the requested products.
///
/// Degrades rather than fails: slugs not in the catalog are ignored, and
/// an unreadable store yields an empty list so the storefront falls back
/// to catalog defaults.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PricingParams>,
) -> Json<PricingResponse> {
    let slugs: Vec<String> = params.slugs.as_deref().map_or_else(
        || products().iter().map(|p| p.slug.to_string()).collect(),
        |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty() && find_product(s).is_some())
                .map(ToString::to_string)
                .collect()
        },
    );

    let rows = match pricing::pricing_rows(state.pool(), &slugs).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "pricing read failed, returning empty rows");
            Vec::new()
        }
    };

    Json(PricingResponse { rows })
}
