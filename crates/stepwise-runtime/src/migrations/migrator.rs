//! Applies and reverses registered migrations against a history store.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use stepwise_core::error::{Result, StepwiseError};
use stepwise_core::migration::{Migration, MigrationRegistry};

use super::report::{DiffReport, Snapshot, StatusReport};
use crate::history::HistoryStore;

/// Stage of a regression round trip, reported after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTripStage {
    Migrated,
    RolledBack,
    Remigrated,
}

/// Status reports collected by [`Migrator::round_trip`].
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub migrated: StatusReport,
    pub rolled_back: StatusReport,
    pub remigrated: StatusReport,
}

/// Migration engine over an ordered registry.
///
/// Each migration's action and its history write are separate steps with
/// no surrounding transaction. A failure stops the run and leaves every
/// earlier step in place.
pub struct Migrator<S: HistoryStore> {
    store: S,
    registry: MigrationRegistry<S::Handle>,
    strict: bool,
}

impl<S: HistoryStore> Migrator<S> {
    /// Create a migrator. Fails if the registry has empty, oversized or
    /// duplicate ids.
    pub fn new(store: S, registry: MigrationRegistry<S::Handle>) -> Result<Self> {
        registry.validate()?;
        Ok(Self {
            store,
            registry,
            strict: true,
        })
    }

    /// Refuse to run when the history holds ids the registry does not know.
    /// On by default.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &MigrationRegistry<S::Handle> {
        &self.registry
    }

    /// Create the history table if needed.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.store.ensure_schema().await
    }

    /// Apply every pending migration in registry order.
    ///
    /// Returns the ids applied by this call.
    pub async fn migrate(&self) -> Result<Vec<String>> {
        let applied = self.load_applied().await?;

        let mut newly_applied = Vec::new();
        for migration in self.registry.iter() {
            if applied.contains(migration.id()) {
                continue;
            }
            self.apply(migration).await?;
            newly_applied.push(migration.id().to_string());
        }

        if newly_applied.is_empty() {
            debug!("No pending migrations");
        }
        Ok(newly_applied)
    }

    /// Reverse the applied migration that is last in registry order.
    pub async fn rollback_last(&self) -> Result<String> {
        let applied = self.load_applied().await?;

        let migration = self
            .registry
            .iter()
            .rev()
            .find(|m| applied.contains(m.id()))
            .ok_or(StepwiseError::NoAppliedMigration)?;

        self.revert(migration).await?;
        Ok(migration.id().to_string())
    }

    /// Reverse every applied migration registered after `target`, newest
    /// first. `target` itself stays applied.
    pub async fn rollback_to(&self, target: &str) -> Result<Vec<String>> {
        let position = self
            .registry
            .position(target)
            .ok_or_else(|| StepwiseError::UnknownMigration(target.to_string()))?;

        let applied = self.load_applied().await?;
        if !applied.contains(target) {
            return Err(StepwiseError::NotApplied(target.to_string()));
        }

        let mut reverted = Vec::new();
        for migration in self.registry.iter().skip(position + 1).rev() {
            if !applied.contains(migration.id()) {
                continue;
            }
            self.revert(migration).await?;
            reverted.push(migration.id().to_string());
        }
        Ok(reverted)
    }

    /// Reverse every applied migration, newest first.
    ///
    /// Stops at the first failure, keeping the reversals done so far.
    pub async fn rollback_all(&self) -> Result<Vec<String>> {
        let mut reverted = Vec::new();
        loop {
            match self.rollback_last().await {
                Ok(id) => reverted.push(id),
                Err(StepwiseError::NoAppliedMigration) => break,
                Err(e) => return Err(e),
            }
        }

        info!("Rolled back {} migrations", reverted.len());
        Ok(reverted)
    }

    /// Applied ids, or an empty set if the history cannot be read.
    pub async fn applied_ids(&self) -> HashSet<String> {
        match self.store.read_applied().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to read migration history: {}", e);
                HashSet::new()
            }
        }
    }

    /// Capture the applied ids.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.applied_ids().await)
    }

    /// Ids applied between two snapshots.
    pub fn diff(&self, before: &Snapshot, after: &Snapshot) -> DiffReport {
        DiffReport::between(before, after, &self.registry)
    }

    /// Classify registered migrations as applied or pending.
    ///
    /// An unreadable history counts as nothing applied.
    pub async fn status(&self) -> Result<StatusReport> {
        self.store.ensure_schema().await?;
        let applied = self.applied_ids().await;
        Ok(StatusReport::classify(&self.registry, &applied))
    }

    /// Migrate, roll everything back, then migrate again.
    pub async fn round_trip(&self) -> Result<RoundTrip> {
        self.round_trip_with(|_, _| {}).await
    }

    /// Like [`round_trip`](Self::round_trip), calling `on_stage` with the
    /// status after each step.
    pub async fn round_trip_with<F>(&self, mut on_stage: F) -> Result<RoundTrip>
    where
        F: FnMut(RoundTripStage, &StatusReport),
    {
        self.migrate().await?;
        let migrated = self.status().await?;
        on_stage(RoundTripStage::Migrated, &migrated);

        self.rollback_all().await?;
        let rolled_back = self.status().await?;
        on_stage(RoundTripStage::RolledBack, &rolled_back);

        self.migrate().await?;
        let remigrated = self.status().await?;
        on_stage(RoundTripStage::Remigrated, &remigrated);

        Ok(RoundTrip {
            migrated,
            rolled_back,
            remigrated,
        })
    }

    async fn load_applied(&self) -> Result<HashSet<String>> {
        self.store.ensure_schema().await?;
        let applied = self.store.read_applied().await?;
        debug!("Already applied migrations: {:?}", applied);

        if self.strict {
            let mut unknown: Vec<String> = applied
                .iter()
                .filter(|id| !self.registry.contains(id))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                unknown.sort();
                return Err(StepwiseError::UnknownAppliedMigration(unknown));
            }
        }

        Ok(applied)
    }

    async fn apply(&self, migration: &Migration<S::Handle>) -> Result<()> {
        let id = migration.id();
        info!("Applying migration: {}", id);

        migration
            .apply(self.store.handle())
            .await
            .map_err(|e| StepwiseError::forward(id, e))?;
        self.store.record(id).await?;

        info!("Migration applied: {}", id);
        Ok(())
    }

    async fn revert(&self, migration: &Migration<S::Handle>) -> Result<()> {
        let id = migration.id();
        if !migration.is_reversible() {
            return Err(StepwiseError::RollbackImpossible(id.to_string()));
        }
        info!("Rolling back migration: {}", id);

        migration
            .revert(self.store.handle())
            .await
            .map_err(|e| StepwiseError::reverse(id, e))?;
        self.store.remove(id).await?;

        info!("Migration rolled back: {}", id);
        Ok(())
    }
}
