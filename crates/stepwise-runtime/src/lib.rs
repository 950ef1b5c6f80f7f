pub mod db;
pub mod history;
pub mod migrations;

pub use db::Database;
pub use history::{HistoryStore, MemoryHistoryStore, PgHistoryStore, HISTORY_TABLE};
pub use migrations::{DiffReport, Migrator, RoundTrip, RoundTripStage, Snapshot, StatusReport};
