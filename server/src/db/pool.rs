//! Connection pool and schema setup for the snapshot store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Shared handle to the snapshot database.
pub type Pool = PgPool;

/// Open a pool holding at most `max_connections` connections.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<Pool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create the `snapshots` table (one blob per workspace key) if it does
/// not exist yet.
pub async fn run_migrations(pool: &Pool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
