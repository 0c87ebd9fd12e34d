//! Database module for PostgreSQL connection and operations
//!
//! The pipeline only sees the [`Database`] trait; [`PgDatabase`] is the
//! PostgreSQL implementation and [`setup`] creates and seeds the sample schema.

pub mod connection;
pub mod postgres;
pub mod setup;

pub use connection::{init_pool, lazy_pool, DbPool};
pub use postgres::PgDatabase;
pub use setup::setup_database;

use crate::error::Result;
use async_trait::async_trait;

/// One result row: column name to value, in the column order the database returned.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Read-only access to a relational database.
///
/// `release` consumes the connection, so a connection cannot be handed back twice.
#[async_trait]
pub trait Database: Send + Sync {
    type Connection: Send;

    async fn acquire(&self) -> Result<Self::Connection>;

    async fn run_query(&self, conn: &mut Self::Connection, sql: &str) -> Result<Vec<Row>>;

    async fn release(&self, conn: Self::Connection);
}
