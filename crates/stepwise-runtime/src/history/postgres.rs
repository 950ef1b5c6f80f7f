use std::collections::HashSet;

use futures::future::BoxFuture;
use sqlx::PgPool;

use stepwise_core::error::{Result, StepwiseError};

use super::{HistoryStore, HISTORY_TABLE};

/// History store backed by the `migrations` table of a PostgreSQL database.
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl HistoryStore for PgHistoryStore {
    type Handle = PgPool;

    fn handle(&self) -> &PgPool {
        &self.pool
    }

    fn ensure_schema(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {} (id VARCHAR(255) PRIMARY KEY)",
                HISTORY_TABLE
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StepwiseError::SchemaSetup(format!("Failed to create migrations table: {}", e))
            })?;
            Ok(())
        })
    }

    fn read_applied(&self) -> BoxFuture<'_, Result<HashSet<String>>> {
        Box::pin(async move {
            let ids: Vec<String> =
                sqlx::query_scalar(&format!("SELECT id FROM {}", HISTORY_TABLE))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        StepwiseError::SchemaSetup(format!(
                            "Failed to read migrations table: {}",
                            e
                        ))
                    })?;

            Ok(ids.into_iter().collect())
        })
    }

    fn record<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            sqlx::query(&format!("INSERT INTO {} (id) VALUES ($1)", HISTORY_TABLE))
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StepwiseError::History(format!("Failed to record migration '{}': {}", id, e))
                })?;
            Ok(())
        })
    }

    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            sqlx::query(&format!("DELETE FROM {} WHERE id = $1", HISTORY_TABLE))
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StepwiseError::History(format!(
                        "Failed to remove migration record '{}': {}",
                        id, e
                    ))
                })?;
            Ok(())
        })
    }
}
