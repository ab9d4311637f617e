//! The race property: concurrent checkouts for the last unit.
//!
//! The conditional decrement is a single atomic UPDATE, so two commits
//! racing for the last unit must resolve to exactly one winner, and
//! inventory must never go negative no matter how often the race runs.

use solstice_integration_tests::{checkout_request, test_pool};
use solstice_orders::OrderError;
use solstice_orders::checkout;
use solstice_orders::db::OverrideRepository;

async fn stored_inventory(pool: &sqlx::PgPool, slug: &str) -> i32 {
    sqlx::query_scalar::<_, Option<i32>>(
        "SELECT inventory FROM product_overrides WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .expect("read inventory")
    .flatten()
    .expect("inventory is finite in this test")
}

#[tokio::test]
async fn test_two_way_race_for_last_unit_100_rounds() {
    let Some(pool) = test_pool().await else { return };
    let slug = "pt-141-10mg";

    for round in 0..100 {
        OverrideRepository::new(&pool)
            .upsert(slug, None, Some(1))
            .await
            .expect("reset inventory");

        let req_a = checkout_request(slug, 1, "race-a@example.com");
        let req_b = checkout_request(slug, 1, "race-b@example.com");
        let a = checkout::commit(&pool, None, &req_a);
        let b = checkout::commit(&pool, None, &req_b);
        let (a, b) = tokio::join!(a, b);

        let successes = usize::from(a.is_ok()) + usize::from(b.is_ok());
        assert_eq!(successes, 1, "round {round}: exactly one commit must win");

        for result in [a, b] {
            if let Err(err) = result {
                assert!(
                    matches!(err, OrderError::OutOfStock { .. }),
                    "round {round}: loser must observe OutOfStock, got {err:?}"
                );
            }
        }

        let remaining = stored_inventory(&pool, slug).await;
        assert_eq!(remaining, 0, "round {round}: inventory must land on zero");
    }
}

#[tokio::test]
async fn test_many_way_race_never_oversells() {
    let Some(pool) = test_pool().await else { return };
    let slug = "nad-plus-500mg";

    OverrideRepository::new(&pool)
        .upsert(slug, None, Some(3))
        .await
        .expect("seed inventory");

    let commits = (0..10).map(|i| {
        let pool = pool.clone();
        let email = format!("swarm-{i}@example.com");
        tokio::spawn(async move {
            checkout::commit(&pool, None, &checkout_request(slug, 1, &email)).await
        })
    });

    let mut successes = 0usize;
    for handle in commits {
        if handle.await.expect("task completes").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 3, "exactly as many winners as units");
    assert_eq!(stored_inventory(&pool, slug).await, 0);
}
