//! PostgreSQL implementation of [`Database`] backed by a sqlx pool.

use super::{Database, DbPool, Row};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgRow;
use sqlx::{Column, Postgres, Row as _, TypeInfo};
use tracing::{debug, warn};

pub struct PgDatabase {
    pool: DbPool,
}

impl PgDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Connection = PoolConnection<Postgres>;

    async fn acquire(&self) -> Result<Self::Connection> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AgentError::Connection(e.to_string()))
    }

    async fn run_query(&self, conn: &mut Self::Connection, sql: &str) -> Result<Vec<Row>> {
        let rows = sqlx::query(sql)
            .fetch_all(&mut **conn)
            .await
            .map_err(|e| AgentError::Execution(driver_message(&e)))?;

        rows.iter().map(row_to_json).collect()
    }

    async fn release(&self, conn: Self::Connection) {
        debug!("Returning connection to the pool");
        drop(conn);
    }
}

fn driver_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

fn row_to_json(row: &PgRow) -> Result<Row> {
    let mut map = Row::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())
            .map_err(|e| AgentError::Execution(driver_message(&e)))?;
        insert_column(&mut map, column.name(), value);
    }
    Ok(map)
}

/// Joins often return the same column name twice (`c.nome, p.nome`).
/// Later duplicates are kept as `nome_2`, `nome_3`, ...
fn insert_column(row: &mut Row, name: &str, value: Value) {
    if !row.contains_key(name) {
        row.insert(name.to_string(), value);
        return;
    }

    let mut n = 2;
    let mut key = format!("{}_{}", name, n);
    while row.contains_key(&key) {
        n += 1;
        key = format!("{}_{}", name, n);
    }
    warn!("Duplicate column {} in result, stored as {}", name, key);
    row.insert(key, value);
}

fn decode_column(
    row: &PgRow,
    idx: usize,
    type_name: &str,
) -> std::result::Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => Value::from(row.try_get::<Option<bool>, _>(idx)?),
        "INT2" => Value::from(row.try_get::<Option<i16>, _>(idx)?),
        "INT4" => Value::from(row.try_get::<Option<i32>, _>(idx)?),
        "INT8" => Value::from(row.try_get::<Option<i64>, _>(idx)?),
        "FLOAT4" => Value::from(row.try_get::<Option<f32>, _>(idx)?),
        "FLOAT8" => Value::from(row.try_get::<Option<f64>, _>(idx)?),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .map(decimal_to_json)
            .unwrap_or(Value::Null),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
            Value::from(row.try_get::<Option<String>, _>(idx)?)
        }
        "TIMESTAMP" => Value::from(
            row.try_get::<Option<chrono::NaiveDateTime>, _>(idx)?
                .map(|ts| ts.to_string()),
        ),
        "TIMESTAMPTZ" => Value::from(
            row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)?
                .map(|ts| ts.to_rfc3339()),
        ),
        "DATE" => Value::from(
            row.try_get::<Option<chrono::NaiveDate>, _>(idx)?
                .map(|d| d.to_string()),
        ),
        "TIME" => Value::from(
            row.try_get::<Option<chrono::NaiveTime>, _>(idx)?
                .map(|t| t.to_string()),
        ),
        "UUID" => Value::from(row.try_get::<Option<uuid::Uuid>, _>(idx)?.map(|u| u.to_string())),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(idx)?.unwrap_or(Value::Null),
        other => match row.try_get::<Option<String>, _>(idx) {
            Ok(text) => Value::from(text),
            Err(_) => {
                warn!("Unsupported column type {}, returning null", other);
                Value::Null
            }
        },
    };
    Ok(value)
}

/// NUMERIC becomes a JSON number when an f64 holds it exactly, otherwise its exact text.
fn decimal_to_json(d: Decimal) -> Value {
    d.to_f64()
        .filter(|f| Decimal::from_str(&f.to_string()).ok() == Some(d))
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(d.to_string()))
}
