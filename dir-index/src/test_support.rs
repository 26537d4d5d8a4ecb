//! Shared test fixture: an in-memory SQLite pool with the schema applied.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub async fn test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite always connects")
}
