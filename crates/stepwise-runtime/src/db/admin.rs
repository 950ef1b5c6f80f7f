//! Database and table administration helpers (PostgreSQL).

use sqlx::PgPool;
use tracing::{debug, info};

use stepwise_core::error::{Result, StepwiseError};

/// Outcome of a create or delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseChange {
    Created,
    AlreadyExists,
    Deleted,
    NotFound,
}

/// Quote an SQL identifier, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create database `name` unless it already exists.
///
/// `pool` must be connected to a different database on the same server,
/// with a role allowed to create databases.
pub async fn create_database(pool: &PgPool, name: &str) -> Result<DatabaseChange> {
    require_name(name)?;

    if database_exists(pool, name).await? {
        info!("Database already exists: {}", name);
        return Ok(DatabaseChange::AlreadyExists);
    }

    sqlx::query(&format!("CREATE DATABASE {}", quote_ident(name)))
        .execute(pool)
        .await
        .map_err(|e| StepwiseError::Database(format!("Failed to create database: {}", e)))?;

    info!("Created database: {}", name);
    Ok(DatabaseChange::Created)
}

/// Drop database `name` if it exists, disconnecting its other sessions first.
pub async fn delete_database(pool: &PgPool, name: &str) -> Result<DatabaseChange> {
    require_name(name)?;

    if !database_exists(pool, name).await? {
        info!("Database does not exist: {}", name);
        return Ok(DatabaseChange::NotFound);
    }

    // Best effort; DROP DATABASE reports the real problem if sessions remain.
    if let Err(e) = sqlx::query(
        r#"
        SELECT pg_terminate_backend(pg_stat_activity.pid)
        FROM pg_stat_activity
        WHERE pg_stat_activity.datname = $1
          AND pid <> pg_backend_pid()
        "#,
    )
    .bind(name)
    .execute(pool)
    .await
    {
        debug!("Failed to terminate sessions on {}: {}", name, e);
    }

    sqlx::query(&format!("DROP DATABASE {}", quote_ident(name)))
        .execute(pool)
        .await
        .map_err(|e| StepwiseError::Database(format!("Failed to delete database: {}", e)))?;

    info!("Deleted database: {}", name);
    Ok(DatabaseChange::Deleted)
}

async fn database_exists(pool: &PgPool, name: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            StepwiseError::Database(format!("Failed to check database existence: {}", e))
        })
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StepwiseError::InvalidArgument(
            "database name is required".to_string(),
        ));
    }
    Ok(())
}

/// Drop the given tables in the current schema.
///
/// Every table must exist; the first missing one is reported and nothing is
/// dropped. Intended for use inside reverse actions.
pub async fn drop_tables(pool: &PgPool, tables: &[&str]) -> Result<()> {
    if tables.is_empty() {
        return Ok(());
    }

    for table in tables {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name::text = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await
        .map_err(|e| StepwiseError::Database(format!("Failed to check table {}: {}", table, e)))?;

        if !exists {
            return Err(StepwiseError::InvalidArgument(format!(
                "table {} does not exist",
                table
            )));
        }
    }

    sqlx::query(&drop_tables_sql(tables))
        .execute(pool)
        .await
        .map_err(|e| StepwiseError::Database(format!("Failed to drop tables: {}", e)))?;

    debug!("Dropped tables: {:?}", tables);
    Ok(())
}

fn drop_tables_sql(tables: &[&str]) -> String {
    let names: Vec<String> = tables.iter().map(|t| quote_ident(t)).collect();
    format!("DROP TABLE {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_drop_tables_sql() {
        assert_eq!(
            drop_tables_sql(&["feedbacks", "feedback_contents"]),
            "DROP TABLE \"feedbacks\", \"feedback_contents\""
        );
    }

    #[test]
    fn test_require_name() {
        assert!(require_name("app").is_ok());
        assert!(matches!(
            require_name("  "),
            Err(StepwiseError::InvalidArgument(_))
        ));
    }
}
