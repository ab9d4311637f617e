//! The static, read-only product catalog.
//!
//! The catalog is compiled in: products change with a deploy, not at run
//! time. Administrators adjust the *effective* price or stock of a product
//! through `product_overrides` rows; the catalog itself never mutates.

use serde::Serialize;

/// A catalog product. Immutable at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique URL-safe key, e.g. `bpc-157-10mg`.
    pub slug: &'static str,
    /// Display name, e.g. `BPC-157`.
    pub name: &'static str,
    /// Variant label, e.g. `10mg`.
    pub variant_label: &'static str,
    /// Default price in integer cents, before any admin override.
    pub base_price_cents: i64,
}

const PRODUCTS: &[Product] = &[
    Product { slug: "semaglutide-5mg", name: "Semaglutide", variant_label: "5mg", base_price_cents: 4900 },
    Product { slug: "semaglutide-10mg", name: "Semaglutide", variant_label: "10mg", base_price_cents: 8900 },
    Product { slug: "tirzepatide-30mg", name: "Tirzepatide", variant_label: "30mg", base_price_cents: 15900 },
    Product { slug: "retatrutide-10mg", name: "Retatrutide", variant_label: "10mg", base_price_cents: 12900 },
    Product { slug: "bpc-157-10mg", name: "BPC-157", variant_label: "10mg", base_price_cents: 7900 },
    Product { slug: "tb-500-10mg", name: "TB-500", variant_label: "10mg", base_price_cents: 8400 },
    Product { slug: "mots-c-10mg", name: "Mots-C", variant_label: "10mg", base_price_cents: 6900 },
    Product { slug: "ghk-cu-50mg", name: "GHK-Cu", variant_label: "50mg", base_price_cents: 5400 },
    Product { slug: "ipamorelin-5mg", name: "Ipamorelin", variant_label: "5mg", base_price_cents: 3900 },
    Product { slug: "cjc-1295-no-dac-5mg", name: "CJC-1295 (no DAC)", variant_label: "5mg", base_price_cents: 4400 },
    Product { slug: "tesamorelin-10mg", name: "Tesamorelin", variant_label: "10mg", base_price_cents: 9900 },
    Product { slug: "epithalon-10mg", name: "Epithalon", variant_label: "10mg", base_price_cents: 5900 },
    Product { slug: "melanotan-ii-10mg", name: "Melanotan-II", variant_label: "10mg", base_price_cents: 4900 },
    Product { slug: "pt-141-10mg", name: "PT-141", variant_label: "10mg", base_price_cents: 5400 },
    Product { slug: "nad-plus-500mg", name: "NAD+", variant_label: "500mg", base_price_cents: 11900 },
    Product { slug: "glutathione-600mg", name: "Glutathione", variant_label: "600mg", base_price_cents: 6400 },
];

/// The full catalog, in display order.
#[must_use]
pub const fn products() -> &'static [Product] {
    PRODUCTS
}

/// Look up a product by slug.
#[must_use]
pub fn find_product(slug: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_are_unique() {
        let mut seen = HashSet::new();
        for product in products() {
            assert!(seen.insert(product.slug), "duplicate slug: {}", product.slug);
        }
    }

    #[test]
    fn test_find_product() {
        let product = find_product("bpc-157-10mg").expect("known slug");
        assert_eq!(product.name, "BPC-157");
        assert_eq!(product.variant_label, "10mg");
        assert_eq!(product.base_price_cents, 7900);

        assert!(find_product("bpc-157-25mg").is_none());
    }

    #[test]
    fn test_prices_are_positive() {
        for product in products() {
            assert!(product.base_price_cents > 0, "{} has no price", product.slug);
        }
    }
}
