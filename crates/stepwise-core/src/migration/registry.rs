use std::collections::HashSet;

use super::definition::{Migration, MAX_ID_LEN};
use crate::error::{Result, StepwiseError};

/// The caller-defined, ordered list of all known migrations.
///
/// Registration order is the application order. Ids are never sorted.
pub struct MigrationRegistry<H> {
    migrations: Vec<Migration<H>>,
}

impl<H> MigrationRegistry<H> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Append a migration, builder style.
    pub fn with(mut self, migration: Migration<H>) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Append a migration.
    pub fn register(&mut self, migration: Migration<H>) {
        self.migrations.push(migration);
    }

    /// Check that every id is non-empty, fits the history column and is unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.migrations.len());

        for migration in &self.migrations {
            let id = migration.id();
            if id.trim().is_empty() {
                return Err(StepwiseError::InvalidMigrationId(
                    "migration id must not be empty".to_string(),
                ));
            }
            if id.chars().count() > MAX_ID_LEN {
                return Err(StepwiseError::InvalidMigrationId(format!(
                    "'{}' is longer than {} characters",
                    id, MAX_ID_LEN
                )));
            }
            if !seen.insert(id) {
                return Err(StepwiseError::DuplicateMigrationId(id.to_string()));
            }
        }

        Ok(())
    }

    /// Get a migration by id.
    pub fn get(&self, id: &str) -> Option<&Migration<H>> {
        self.migrations.iter().find(|m| m.id() == id)
    }

    /// Position of a migration in application order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.migrations.iter().position(|m| m.id() == id)
    }

    /// Check if a migration is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All ids in application order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.migrations.iter().map(|m| m.id())
    }

    /// All migrations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Migration<H>> {
        self.migrations.iter()
    }

    /// Get the number of registered migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl<H> Default for MigrationRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for MigrationRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            migrations: self.migrations.clone(),
        }
    }
}

impl<H> From<Vec<Migration<H>>> for MigrationRegistry<H> {
    fn from(migrations: Vec<Migration<H>>) -> Self {
        Self { migrations }
    }
}

impl<H> FromIterator<Migration<H>> for MigrationRegistry<H> {
    fn from_iter<I: IntoIterator<Item = Migration<H>>>(iter: I) -> Self {
        Self {
            migrations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(id: &str) -> Migration<()> {
        Migration::new(
            id,
            |_| Box::pin(async { Ok(()) }),
            |_| Box::pin(async { Ok(()) }),
        )
    }

    #[test]
    fn test_empty_registry() {
        let registry: MigrationRegistry<()> = MigrationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("nonexistent").is_none());
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = MigrationRegistry::new()
            .with(noop("20251107_c"))
            .with(noop("20251107_a"))
            .with(noop("20251107_b"));

        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec!["20251107_c", "20251107_a", "20251107_b"]);
        assert_eq!(registry.position("20251107_a"), Some(1));
        assert!(registry.contains("20251107_b"));
        assert!(!registry.contains("20251107_d"));
    }

    #[test]
    fn test_iter_tail_in_reverse() {
        let registry = MigrationRegistry::new()
            .with(noop("a"))
            .with(noop("b"))
            .with(noop("c"))
            .with(noop("d"));

        let tail: Vec<_> = registry.iter().skip(2).rev().map(|m| m.id()).collect();
        assert_eq!(tail, vec!["d", "c"]);
        assert_eq!(registry.iter().len(), 4);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let registry: MigrationRegistry<()> = vec![noop("a"), noop("b"), noop("a")].into();
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, StepwiseError::DuplicateMigrationId(id) if id == "a"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let registry: MigrationRegistry<()> = vec![noop("a"), noop("  ")].into();
        assert!(matches!(
            registry.validate(),
            Err(StepwiseError::InvalidMigrationId(_))
        ));
    }

    #[test]
    fn test_overlong_id_rejected() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        let registry: MigrationRegistry<()> = std::iter::once(noop(&long)).collect();
        assert!(matches!(
            registry.validate(),
            Err(StepwiseError::InvalidMigrationId(_))
        ));

        let fits = "x".repeat(MAX_ID_LEN);
        let registry: MigrationRegistry<()> = std::iter::once(noop(&fits)).collect();
        assert!(registry.validate().is_ok());
    }
}
