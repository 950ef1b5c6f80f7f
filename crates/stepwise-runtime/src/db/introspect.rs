//! Read the current schema's tables and columns from `information_schema`.

use sqlx::PgPool;
use tracing::debug;

use stepwise_core::error::{Result, StepwiseError};
use stepwise_core::schema::{ColumnSchema, SqlType, TableSchema};

use crate::history::HISTORY_TABLE;

/// One `information_schema.columns` row.
type ColumnRow = (
    String,         // table_name
    String,         // column_name
    String,         // data_type
    String,         // udt_name
    String,         // is_nullable
    Option<String>, // column_default
    Option<i32>,    // character_maximum_length
    bool,           // part of primary key
);

const COLUMNS_SQL: &str = r#"
SELECT
    c.table_name::text,
    c.column_name::text,
    c.data_type::text,
    c.udt_name::text,
    c.is_nullable::text,
    c.column_default::text,
    c.character_maximum_length::int4,
    EXISTS (
        SELECT 1
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage k
          ON k.constraint_name = tc.constraint_name
         AND k.table_schema = tc.table_schema
         AND k.table_name = tc.table_name
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND tc.table_schema = c.table_schema
          AND tc.table_name = c.table_name
          AND k.column_name = c.column_name
    )
FROM information_schema.columns c
JOIN information_schema.tables t
  ON t.table_schema = c.table_schema
 AND t.table_name = c.table_name
WHERE c.table_schema = current_schema()
  AND t.table_type = 'BASE TABLE'
  AND c.table_name::text <> $1
ORDER BY c.table_name, c.ordinal_position
"#;

/// List every base table of the current schema except the history table.
///
/// Tables are sorted by name, columns keep their ordinal order.
pub async fn introspect_tables(pool: &PgPool) -> Result<Vec<TableSchema>> {
    let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
        .bind(HISTORY_TABLE)
        .fetch_all(pool)
        .await
        .map_err(|e| StepwiseError::Database(format!("Failed to list tables: {}", e)))?;

    let tables = group_columns(rows);
    debug!("Introspected {} tables", tables.len());
    Ok(tables)
}

fn group_columns(rows: Vec<ColumnRow>) -> Vec<TableSchema> {
    let mut tables: Vec<TableSchema> = Vec::new();

    for (table, column, data_type, udt_name, is_nullable, default, max_len, pk) in rows {
        let column = ColumnSchema {
            name: column,
            sql_type: SqlType::from_information_schema(&data_type, &udt_name, max_len),
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            default,
            primary_key: pk,
        };

        match tables.last_mut() {
            Some(current) if current.name == table => current.columns.push(column),
            _ => tables.push(TableSchema::new(table).with_column(column)),
        }
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &str, column: &str, data_type: &str, udt: &str, nullable: bool) -> ColumnRow {
        (
            table.to_string(),
            column.to_string(),
            data_type.to_string(),
            udt.to_string(),
            if nullable { "YES" } else { "NO" }.to_string(),
            None,
            None,
            column == "id",
        )
    }

    #[test]
    fn test_group_columns_by_table() {
        let rows = vec![
            row("orders", "id", "uuid", "uuid", false),
            row("orders", "amount", "integer", "int4", true),
            row("users", "id", "uuid", "uuid", false),
        ];

        let tables = group_columns(rows);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "orders");
        assert_eq!(tables[0].columns.len(), 2);
        assert!(tables[0].columns[0].primary_key);
        assert!(tables[0].columns[1].nullable);
        assert_eq!(tables[0].columns[1].sql_type, SqlType::Integer);
        assert_eq!(tables[1].name, "users");
    }

    #[test]
    fn test_group_columns_empty() {
        assert!(group_columns(Vec::new()).is_empty());
    }
}
