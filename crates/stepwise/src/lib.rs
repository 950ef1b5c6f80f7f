//! stepwise: ordered, reversible database migrations for PostgreSQL.
//!
//! A host binary builds a [`MigrationRegistry`] and hands it to
//! [`Stepwise`], which dispatches the migration commands (`up`, `down`,
//! `status`, `gen`, `regression`, `create-db`, `delete-db`) and otherwise lets
//! the host continue with its own work.

mod app;
mod cli;

pub use app::{Outcome, Stepwise};

pub use stepwise_codegen::ModelGenerator;
pub use stepwise_core::config::StepwiseConfig;
pub use stepwise_core::error::{Result, StepwiseError};
pub use stepwise_core::migration::{Migration, MigrationRegistry};
pub use stepwise_runtime::db::drop_tables;
pub use stepwise_runtime::{Migrator, PgHistoryStore};

// Testing assertion macros are #[macro_export]ed at the stepwise_core root.
#[cfg(feature = "testing")]
pub use stepwise_core::{assert_err, assert_err_variant, assert_ok};

/// Prelude module for common imports.
pub mod prelude {
    pub use sqlx::PgPool;

    pub use stepwise_core::config::StepwiseConfig;
    pub use stepwise_core::error::{Result, StepwiseError};
    pub use stepwise_core::migration::{Migration, MigrationRegistry};
    pub use stepwise_runtime::db::drop_tables;
    pub use stepwise_runtime::{HistoryStore, Migrator, PgHistoryStore};

    pub use crate::{Outcome, Stepwise};
}
