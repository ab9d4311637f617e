//! Commit engine integration tests: pricing, reservation, and rollback.

use solstice_integration_tests::{checkout_request, checkout_request_lines, test_pool};
use solstice_orders::OrderError;
use solstice_orders::checkout::{self, CartLine};
use solstice_orders::db::{OrderRepository, OverrideRepository};

async fn stored_inventory(pool: &sqlx::PgPool, slug: &str) -> Option<i32> {
    sqlx::query_scalar::<_, Option<i32>>(
        "SELECT inventory FROM product_overrides WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .expect("read inventory")
    .flatten()
}

#[tokio::test]
async fn test_override_price_and_inventory_scenario() {
    let Some(pool) = test_pool().await else { return };
    let overrides = OverrideRepository::new(&pool);

    // Catalog base price for bpc-157-10mg is 7900; override to 6900 with 2 in stock.
    overrides.upsert("bpc-157-10mg", Some(6900), Some(2)).await.expect("seed override");

    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("bpc-157-10mg", 2, "scenario@example.com"),
    )
    .await
    .expect("commit succeeds with sufficient stock");

    let repo = OrderRepository::new(&pool);
    let order = repo.get(order_id).await.expect("load").expect("exists");
    assert_eq!(order.subtotal_cents, 13_800);
    assert_eq!(order.total_cents, 13_800);
    assert_eq!(order.email, "scenario@example.com");

    let items = repo.items(order_id).await.expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].unit_price_cents, 6900);
    assert_eq!(items[0].line_total_cents, 13_800);
    assert_eq!(items[0].product_name, "BPC-157");

    // Inventory decremented by exactly qty.
    assert_eq!(stored_inventory(&pool, "bpc-157-10mg").await, Some(0));

    // A subsequent order for the same slug fails out of stock.
    let err = checkout::commit(
        &pool,
        None,
        &checkout_request("bpc-157-10mg", 1, "scenario2@example.com"),
    )
    .await
    .expect_err("stock exhausted");
    match err {
        OrderError::OutOfStock { name, requested, available, .. } => {
            assert_eq!(name, "BPC-157");
            assert_eq!(requested, 1);
            assert_eq!(available, 0);
        }
        other => panic!("expected OutOfStock, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_commit_rolls_back_every_line() {
    let Some(pool) = test_pool().await else { return };
    let overrides = OverrideRepository::new(&pool);

    // First line has plenty, second line cannot be satisfied.
    overrides.upsert("tb-500-10mg", None, Some(5)).await.expect("seed");
    overrides.upsert("mots-c-10mg", None, Some(1)).await.expect("seed");

    let request = checkout_request_lines(
        vec![
            CartLine { slug: "tb-500-10mg".to_string(), qty: 2 },
            CartLine { slug: "mots-c-10mg".to_string(), qty: 3 },
        ],
        "rollback@example.com",
    );

    let err = checkout::commit(&pool, None, &request).await.expect_err("second line fails");
    assert!(matches!(err, OrderError::OutOfStock { .. }));

    // No inventory row for any line changed.
    assert_eq!(stored_inventory(&pool, "tb-500-10mg").await, Some(5));
    assert_eq!(stored_inventory(&pool, "mots-c-10mg").await, Some(1));

    // No order rows exist for the failed checkout.
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE email = 'rollback@example.com'")
            .fetch_one(&pool)
            .await
            .expect("count orders");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_duplicate_lines_reserve_in_submission_order() {
    let Some(pool) = test_pool().await else { return };
    let overrides = OverrideRepository::new(&pool);

    // Two lines of 2 against a stock of 3: the second decrement fails and
    // the whole order aborts, including the first line's reservation.
    overrides.upsert("ghk-cu-50mg", None, Some(3)).await.expect("seed");

    let request = checkout_request_lines(
        vec![
            CartLine { slug: "ghk-cu-50mg".to_string(), qty: 2 },
            CartLine { slug: "ghk-cu-50mg".to_string(), qty: 2 },
        ],
        "duplicate-lines@example.com",
    );

    let err = checkout::commit(&pool, None, &request).await.expect_err("sum exceeds stock");
    assert!(matches!(err, OrderError::OutOfStock { .. }));
    assert_eq!(stored_inventory(&pool, "ghk-cu-50mg").await, Some(3));
}

#[tokio::test]
async fn test_unknown_slug_rejects_whole_cart() {
    let Some(pool) = test_pool().await else { return };

    let request = checkout_request_lines(
        vec![
            CartLine { slug: "bpc-157-10mg".to_string(), qty: 1 },
            CartLine { slug: "bpc-157-25mg".to_string(), qty: 1 },
        ],
        "unknown@example.com",
    );

    let err = checkout::commit(&pool, None, &request).await.expect_err("unknown slug");
    match err {
        OrderError::UnknownProduct { slug } => assert_eq!(slug, "bpc-157-25mg"),
        other => panic!("expected UnknownProduct, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unlimited_inventory_needs_no_override_row() {
    let Some(pool) = test_pool().await else { return };
    let overrides = OverrideRepository::new(&pool);

    // No override at all: catalog price, unlimited stock.
    overrides.delete("epithalon-10mg").await.expect("clear override");

    let order_id = checkout::commit(
        &pool,
        None,
        &checkout_request("epithalon-10mg", 99, "unlimited@example.com"),
    )
    .await
    .expect("unlimited inventory commits");

    let order = OrderRepository::new(&pool).get(order_id).await.expect("load").expect("exists");
    assert_eq!(order.subtotal_cents, 5900 * 99);
    assert_eq!(stored_inventory(&pool, "epithalon-10mg").await, None);
}
