//! Durable record of applied migration ids.
//!
//! The history is one table, `migrations`, with a single `id` column
//! (`VARCHAR(255)`, primary key). A row exists exactly while the migration's
//! forward action is in effect.

mod memory;
mod postgres;

pub use memory::MemoryHistoryStore;
pub use postgres::PgHistoryStore;

use std::collections::HashSet;

use futures::future::BoxFuture;
use stepwise_core::Result;

/// Name of the history table.
pub const HISTORY_TABLE: &str = "migrations";

/// Storage for the set of applied migration ids.
///
/// Writes are not wrapped in a transaction; each call is visible to the
/// next as soon as it returns.
pub trait HistoryStore: Send + Sync {
    /// Database handle handed to forward and reverse actions.
    type Handle: Send + Sync;

    /// The handle migrations run against.
    fn handle(&self) -> &Self::Handle;

    /// Create the history table if it does not exist.
    ///
    /// Failures are `StepwiseError::SchemaSetup`.
    fn ensure_schema(&self) -> BoxFuture<'_, Result<()>>;

    /// Read every applied id.
    ///
    /// Failures are `StepwiseError::SchemaSetup`.
    fn read_applied(&self) -> BoxFuture<'_, Result<HashSet<String>>>;

    /// Mark `id` applied.
    fn record<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Mark `id` pending again.
    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>>;
}
