//! Seed demo data for local development.

use solstice_orders::db::OverrideRepository;

use super::{CommandError, connect};

/// Demo overrides: a discounted price with finite stock, a stock-only cap,
/// and a price-only change.
const DEMO_OVERRIDES: &[(&str, Option<i64>, Option<i32>)] = &[
    ("bpc-157-10mg", Some(6900), Some(2)),
    ("semaglutide-5mg", None, Some(10)),
    ("retatrutide-10mg", Some(11900), None),
];

/// Insert demo price/inventory overrides.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a write fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = OverrideRepository::new(&pool);

    for (slug, price_cents, inventory) in DEMO_OVERRIDES {
        repo.upsert(slug, *price_cents, *inventory).await?;
        tracing::info!(slug = %slug, "override seeded");
    }

    Ok(())
}
