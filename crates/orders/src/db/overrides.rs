//! Repository for admin price/inventory overrides.
//!
//! Overrides are the only mutable pricing/inventory state in the system.
//! The inventory counter is shared between concurrent checkouts and admin
//! edits, so the decrement is a single atomic conditional UPDATE at the
//! store, never a read-modify-write in application code.

use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::PriceOverride;

/// Repository for `product_overrides` rows.
pub struct OverrideRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OverrideRepository<'a> {
    /// Create a new override repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every override, newest edit first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PriceOverride>, RepositoryError> {
        let rows = sqlx::query_as::<_, PriceOverride>(
            r"
            SELECT slug, price_cents, inventory, updated_at
            FROM product_overrides
            ORDER BY updated_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetch the overrides for a set of slugs in one round trip.
    ///
    /// Slugs without an override simply do not appear in the result; the
    /// caller falls back to catalog defaults for those.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_slugs(&self, slugs: &[String]) -> Result<Vec<PriceOverride>, RepositoryError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PriceOverride>(
            r"
            SELECT slug, price_cents, inventory, updated_at
            FROM product_overrides
            WHERE slug = ANY($1)
            ",
        )
        .bind(slugs)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create or replace the override for a slug.
    ///
    /// A row with both fields null means "no override" and is deleted
    /// instead of stored, so the table only ever holds meaningful rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert(
        &self,
        slug: &str,
        price_cents: Option<i64>,
        inventory: Option<i32>,
    ) -> Result<(), RepositoryError> {
        if price_cents.is_none() && inventory.is_none() {
            self.delete(slug).await?;
            return Ok(());
        }

        sqlx::query(
            r"
            INSERT INTO product_overrides (slug, price_cents, inventory, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (slug) DO UPDATE
            SET price_cents = EXCLUDED.price_cents,
                inventory = EXCLUDED.inventory,
                updated_at = now()
            ",
        )
        .bind(slug)
        .bind(price_cents)
        .bind(inventory)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the override for a slug.
    ///
    /// Returns `true` if a row was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, slug: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_overrides WHERE slug = $1")
            .bind(slug)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Atomically subtract `qty` units, but only if at least `qty` remain.
///
/// This is the compare-and-decrement at the heart of the commit engine: a
/// single round trip, so two checkouts racing for the last unit cannot both
/// succeed. Returns `true` if a row was decremented, `false` if the stored
/// inventory was insufficient (or the override vanished or went unlimited
/// since resolution — either way nothing was reserved).
///
/// Runs on a transaction connection so a later abort rolls it back.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn conditional_decrement(
    conn: &mut PgConnection,
    slug: &str,
    qty: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE product_overrides
        SET inventory = inventory - $1, updated_at = now()
        WHERE slug = $2 AND inventory IS NOT NULL AND inventory >= $1
        ",
    )
    .bind(qty)
    .bind(slug)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Read the currently stored inventory for a slug, on the same transaction
/// connection. Used to report `available` after a failed decrement.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn stored_inventory(
    conn: &mut PgConnection,
    slug: &str,
) -> Result<Option<i32>, RepositoryError> {
    let row: Option<Option<i32>> =
        sqlx::query_scalar("SELECT inventory FROM product_overrides WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

    // Missing row and NULL inventory both mean "nothing left to reserve
    // against" from the failed line's point of view.
    Ok(row.flatten())
}
