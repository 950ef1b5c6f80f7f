use serde::{Deserialize, Serialize};

use super::types::{RustType, SqlType};

/// A table as found in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,

    /// Columns in ordinal order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column, builder style.
    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Primary key columns in ordinal order.
    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// A column as found in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,

    /// SQL type.
    pub sql_type: SqlType,

    /// Whether the column accepts NULL.
    pub nullable: bool,

    /// Default value expression (SQL).
    pub default: Option<String>,

    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl ColumnSchema {
    /// Create a NOT NULL column without a default.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
            default: None,
            primary_key: false,
        }
    }

    /// Mark the column nullable.
    pub fn as_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the column as (part of) the primary key.
    pub fn as_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// The Rust type a row decoder needs for this column.
    pub fn rust_type(&self) -> RustType {
        let base = RustType::from_sql_type(&self.sql_type);
        if self.nullable {
            RustType::Option(Box::new(base))
        } else {
            base
        }
    }
}
