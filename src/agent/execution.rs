//! Runs validated SQL against the database collaborator.

use crate::agent::generation::preview;
use crate::agent::pipeline::panic_message;
use crate::db::{Database, Row};
use crate::error::{AgentError, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

/// Acquire a connection, run `sql`, release the connection.
///
/// Errors are [`AgentError::Connection`] when no connection could be acquired
/// (nothing was executed) and [`AgentError::Execution`] when the query failed.
/// After a successful acquire the connection is released exactly once, even
/// when the query panics.
pub async fn execute_sql<D: Database>(db: &D, sql: &str) -> Result<Vec<Row>> {
    info!("Executing SQL: {}", preview(sql));

    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Database connection failed: {}", e);
            return Err(match e {
                AgentError::Connection(_) => e,
                other => AgentError::Connection(other.to_string()),
            });
        }
    };

    let outcome = AssertUnwindSafe(db.run_query(&mut conn, sql))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(AgentError::Execution(panic_message(payload))));
    db.release(conn).await;

    match outcome {
        Ok(rows) => {
            info!("Query executed successfully, {} rows returned", rows.len());
            Ok(rows)
        }
        Err(e) => {
            error!("Query execution failed: {}", e);
            Err(match e {
                AgentError::Execution(_) => e,
                other => AgentError::Execution(other.to_string()),
            })
        }
    }
}
