use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::future::BoxFuture;

use stepwise_core::error::{Result, StepwiseError};

use super::HistoryStore;

/// In-process history store.
///
/// Behaves like the PostgreSQL store: reads and writes fail until
/// `ensure_schema` has run. Failures can be injected for tests.
pub struct MemoryHistoryStore<H = ()> {
    handle: H,
    applied: Mutex<HashSet<String>>,
    schema_ready: AtomicBool,
    fail_schema: AtomicBool,
    fail_reads: AtomicBool,
}

impl<H> MemoryHistoryStore<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            applied: Mutex::new(HashSet::new()),
            schema_ready: AtomicBool::new(false),
            fail_schema: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Seed the store with already-applied ids, as if a previous run left them.
    pub fn with_applied<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids().extend(ids.into_iter().map(Into::into));
        self.schema_ready.store(true, Ordering::SeqCst);
        self
    }

    /// Make `ensure_schema` fail.
    pub fn fail_schema_setup(&self, fail: bool) {
        self.fail_schema.store(fail, Ordering::SeqCst);
    }

    /// Make `read_applied` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Whether the history table has been created.
    pub fn has_schema(&self) -> bool {
        self.schema_ready.load(Ordering::SeqCst)
    }

    /// Copy of the recorded ids, bypassing failure injection.
    pub fn recorded(&self) -> HashSet<String> {
        self.ids().clone()
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<String>> {
        self.applied.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn require_schema(&self) -> Result<()> {
        if self.has_schema() {
            Ok(())
        } else {
            Err(StepwiseError::SchemaSetup(
                "migrations table does not exist".to_string(),
            ))
        }
    }
}

impl Default for MemoryHistoryStore<()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<H: Send + Sync> HistoryStore for MemoryHistoryStore<H> {
    type Handle = H;

    fn handle(&self) -> &H {
        &self.handle
    }

    fn ensure_schema(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.fail_schema.load(Ordering::SeqCst) {
                return Err(StepwiseError::SchemaSetup(
                    "Failed to create migrations table: injected failure".to_string(),
                ));
            }
            self.schema_ready.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn read_applied(&self) -> BoxFuture<'_, Result<HashSet<String>>> {
        Box::pin(async move {
            self.require_schema()?;
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StepwiseError::SchemaSetup(
                    "Failed to read migrations table: injected failure".to_string(),
                ));
            }
            Ok(self.ids().clone())
        })
    }

    fn record<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.require_schema()?;
            if !self.ids().insert(id.to_string()) {
                return Err(StepwiseError::History(format!(
                    "Failed to record migration '{}': already recorded",
                    id
                )));
            }
            Ok(())
        })
    }

    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.require_schema()?;
            self.ids().remove(id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_fail_before_schema_exists() {
        let store = MemoryHistoryStore::default();
        assert!(matches!(
            store.read_applied().await,
            Err(StepwiseError::SchemaSetup(_))
        ));

        store.ensure_schema().await.unwrap();
        assert!(store.read_applied().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_and_remove() {
        let store = MemoryHistoryStore::default();
        store.ensure_schema().await.unwrap();

        store.record("0001_users").await.unwrap();
        assert!(store.recorded().contains("0001_users"));

        // Primary key violation
        assert!(matches!(
            store.record("0001_users").await,
            Err(StepwiseError::History(_))
        ));

        store.remove("0001_users").await.unwrap();
        assert!(store.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryHistoryStore::default().with_applied(["a"]);
        store.fail_reads(true);
        assert!(store.read_applied().await.is_err());
        assert_eq!(store.recorded().len(), 1);

        store.fail_schema_setup(true);
        assert!(matches!(
            store.ensure_schema().await,
            Err(StepwiseError::SchemaSetup(_))
        ));
    }

    #[test]
    fn test_seeding_creates_schema() {
        let store = MemoryHistoryStore::default();
        assert!(!store.has_schema());
        let store = store.with_applied(vec!["a".to_string()]);
        assert!(store.has_schema());
    }
}
