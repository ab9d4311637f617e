//! Pricing & inventory resolver.
//!
//! Merges catalog defaults with optional admin overrides into the
//! *effective* price and *effective* inventory ceiling for each product.
//! Pure read: one round trip for the overrides, no caching, consistent
//! within a single call.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use solstice_core::catalog::{Product, find_product};

use crate::db::OverrideRepository;
use crate::error::OrderError;
use crate::models::PriceOverride;

/// Effective price and inventory for one product at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub slug: String,
    pub name: &'static str,
    pub variant_label: &'static str,
    /// Override price if present, catalog base price otherwise.
    pub effective_price_cents: i64,
    /// Override inventory if present. `None` means unlimited - there is no
    /// independent catalog inventory concept.
    pub effective_inventory: Option<i32>,
}

/// Wire row for the public pricing API.
#[derive(Debug, Clone, Serialize)]
pub struct PricingRow {
    pub slug: String,
    pub effective_price_cents: i64,
    pub effective_inventory: Option<i32>,
}

/// Resolve effective price/inventory for a set of slugs.
///
/// Callers should pass slugs deduplicated to avoid redundant lookups, but
/// duplicates are harmless: every occurrence resolves identically within
/// one call.
///
/// # Errors
///
/// Returns `OrderError::UnknownProduct` if any slug is not in the catalog -
/// the whole request is rejected rather than a line silently dropped.
/// Returns `OrderError::Repository` if the override read fails.
pub async fn resolve(
    pool: &PgPool,
    slugs: &[String],
) -> Result<HashMap<String, ResolvedProduct>, OrderError> {
    let mut products = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let product = find_product(slug).ok_or_else(|| OrderError::UnknownProduct {
            slug: slug.clone(),
        })?;
        products.push(product);
    }

    let overrides = OverrideRepository::new(pool).for_slugs(slugs).await?;
    let override_by_slug: HashMap<&str, &PriceOverride> =
        overrides.iter().map(|o| (o.slug.as_str(), o)).collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let resolved = merge(product, override_by_slug.get(product.slug).copied());
            (product.slug.to_string(), resolved)
        })
        .collect())
}

/// Resolve display rows for the storefront pricing API, in catalog order.
///
/// # Errors
///
/// Same failure modes as [`resolve`]; the route layer degrades an
/// unreadable store to an empty list.
pub async fn pricing_rows(pool: &PgPool, slugs: &[String]) -> Result<Vec<PricingRow>, OrderError> {
    let resolved = resolve(pool, slugs).await?;

    Ok(slugs
        .iter()
        .filter_map(|slug| resolved.get(slug))
        .map(|r| PricingRow {
            slug: r.slug.clone(),
            effective_price_cents: r.effective_price_cents,
            effective_inventory: r.effective_inventory,
        })
        .collect())
}

/// Merge one product's catalog defaults with its optional override.
fn merge(product: &'static Product, override_row: Option<&PriceOverride>) -> ResolvedProduct {
    ResolvedProduct {
        slug: product.slug.to_string(),
        name: product.name,
        variant_label: product.variant_label,
        effective_price_cents: override_row
            .and_then(|o| o.price_cents)
            .unwrap_or(product.base_price_cents),
        effective_inventory: override_row.and_then(|o| o.inventory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn override_row(price_cents: Option<i64>, inventory: Option<i32>) -> PriceOverride {
        PriceOverride {
            slug: "bpc-157-10mg".to_string(),
            price_cents,
            inventory,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_without_override_uses_catalog_defaults() {
        let product = find_product("bpc-157-10mg").expect("known slug");
        let resolved = merge(product, None);
        assert_eq!(resolved.effective_price_cents, 7900);
        assert_eq!(resolved.effective_inventory, None);
    }

    #[test]
    fn test_merge_override_price_and_inventory() {
        let product = find_product("bpc-157-10mg").expect("known slug");
        let resolved = merge(product, Some(&override_row(Some(6900), Some(2))));
        assert_eq!(resolved.effective_price_cents, 6900);
        assert_eq!(resolved.effective_inventory, Some(2));
    }

    #[test]
    fn test_merge_partial_override_keeps_base_price() {
        let product = find_product("bpc-157-10mg").expect("known slug");
        // Inventory capped but price untouched
        let resolved = merge(product, Some(&override_row(None, Some(5))));
        assert_eq!(resolved.effective_price_cents, 7900);
        assert_eq!(resolved.effective_inventory, Some(5));
    }

    #[test]
    fn test_merge_zero_inventory_is_not_unlimited() {
        let product = find_product("bpc-157-10mg").expect("known slug");
        let resolved = merge(product, Some(&override_row(None, Some(0))));
        assert_eq!(resolved.effective_inventory, Some(0));
    }
}
