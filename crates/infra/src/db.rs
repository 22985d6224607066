//! Postgres wiring: pool construction, schema migration and error mapping.
//!
//! ## Error mapping
//!
//! | SQLx error | PostgreSQL code | `StoreError` |
//! |---|---|---|
//! | foreign key violation | `23503` | `NotFound` (unknown branch/product/transfer) |
//! | check violation | `23514` | `Domain(Validation)` |
//! | unique violation | `23505` | `Transaction` |
//! | any other database error | any | `Transaction` |
//! | pool closed, IO, protocol | n/a | `Transaction` |

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use stockbook_core::DomainError;

use crate::config::AppConfig;
use crate::error::StoreError;

/// Schema applied by [`migrate`].
pub const STOCK_LEDGER_SCHEMA: &str = include_str!("../migrations/0001_stock_ledger.sql");

/// Open a pool for `database_url` sized by the config.
#[instrument(skip_all, err)]
pub async fn connect(config: &AppConfig, database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Apply the schema. Every statement is `IF NOT EXISTS`, so reruns are no-ops.
#[instrument(skip_all, err)]
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(STOCK_LEDGER_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    tracing::info!("stock ledger schema applied");
    Ok(())
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23503") => StoreError::NotFound(msg),
                Some("23514") => StoreError::Domain(DomainError::validation(msg)),
                _ => StoreError::Transaction(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Transaction(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Transaction(format!("sqlx error in {operation}: {other}")),
    }
}

/// Row decode failures are storage corruption, not caller errors.
pub(crate) fn map_decode_error(what: &str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Transaction(format!("failed to decode {what} row: {err}"))
}
