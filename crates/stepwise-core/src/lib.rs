pub mod config;
pub mod error;
pub mod migration;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::StepwiseConfig;
pub use error::{Result, StepwiseError};
pub use migration::{Migration, MigrationRegistry};
pub use schema::{ColumnSchema, RustType, SqlType, TableSchema};
