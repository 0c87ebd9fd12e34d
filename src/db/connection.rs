//! Database connection management using sqlx

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub type DbPool = PgPool;

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Connect eagerly and check the server answers.
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(config)
        .connect(&config.connection_url())
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Build a pool that opens connections on first acquire, so an unreachable
/// server shows up as an acquire failure instead of a startup failure.
pub fn lazy_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.connection_url())
}
