//! Database migration command.
//!
//! Runs the order-pipeline migrations embedded in `solstice-orders`, then
//! the tower-sessions store migration. Binaries never migrate on startup;
//! this command is the only migration path.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all migrations against `DATABASE_URL`.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running order pipeline migrations...");
    solstice_orders::db::migrator().run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete");
    Ok(())
}
