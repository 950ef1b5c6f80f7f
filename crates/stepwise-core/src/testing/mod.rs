//! Testing utilities for stepwise users and for stepwise's own test suites.
//!
//! Migrator behaviour can be exercised without a server through
//! `MemoryHistoryStore` in stepwise-runtime. Tests that need PostgreSQL
//! opt in through `TestDatabase::from_env()` and get a throwaway database
//! per test from `TestDatabase::isolated()`.
//!
//! # Example
//!
//! ```ignore
//! #[tokio::test]
//! async fn test_round_trip() {
//!     let Ok(db) = TestDatabase::from_env().await else { return };
//!     let db = db.isolated("round_trip").await.unwrap();
//!     let migrator = Migrator::new(PgHistoryStore::new(db.pool().clone()), registry()).unwrap();
//!     assert_ok!(migrator.migrate().await);
//!     db.cleanup().await.unwrap();
//! }
//! ```

pub mod assertions;
pub mod db;

pub use assertions::*;
pub use db::{IsolatedTestDb, TestDatabase};
