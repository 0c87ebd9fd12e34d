//! Creates the sample tables and seeds them when empty.

use super::DbPool;
use crate::error::Result;
use crate::schema::{CREATE_TABLES, INSERT_CUSTOMERS, INSERT_PRODUCTS, INSERT_TRANSACTIONS};
use tracing::{debug, info};

/// Returns `true` when sample data was inserted, `false` when the tables already had rows.
pub async fn setup_database(pool: &DbPool) -> Result<bool> {
    info!("Setting up database schema");
    let mut tx = pool.begin().await?;

    for statement in CREATE_TABLES.iter() {
        sqlx::query(statement).execute(&mut *tx).await?;
        debug!("Executed: {}", statement.trim().lines().next().unwrap_or_default());
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clientes")
        .fetch_one(&mut *tx)
        .await?;

    let seeded = count == 0;
    if seeded {
        info!("Inserting sample data");
        sqlx::query(INSERT_CUSTOMERS).execute(&mut *tx).await?;
        sqlx::query(INSERT_PRODUCTS).execute(&mut *tx).await?;
        sqlx::query(INSERT_TRANSACTIONS).execute(&mut *tx).await?;
    } else {
        info!("clientes already has {} rows, skipping sample data", count);
    }

    // An uncommitted transaction rolls back on drop
    tx.commit().await?;
    info!("Database setup complete");
    Ok(seeded)
}
