//! Status and change reports, and their console rendering.

use std::collections::HashSet;
use std::fmt::Write as _;

use stepwise_core::migration::MigrationRegistry;

/// Applied ids captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    ids: HashSet<String>,
}

impl Snapshot {
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<I: Into<String>> FromIterator<I> for Snapshot {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Ids applied between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub new_ids: Vec<String>,
}

impl DiffReport {
    /// Ids in `after` but not in `before`.
    ///
    /// Registered ids come first in registry order; the rest follow sorted.
    pub fn between<H>(
        before: &Snapshot,
        after: &Snapshot,
        registry: &MigrationRegistry<H>,
    ) -> Self {
        let mut keyed: Vec<(usize, String)> = after
            .ids
            .difference(&before.ids)
            .map(|id| (registry.position(id).unwrap_or(usize::MAX), id.clone()))
            .collect();
        keyed.sort();

        Self {
            new_ids: keyed.into_iter().map(|(_, id)| id).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_ids.is_empty()
    }

    pub fn render(&self) -> String {
        if self.new_ids.is_empty() {
            return "✅ Migration complete (no change)\n".to_string();
        }

        let mut out = String::from("✅ Migration complete.\n🆕 New migrations applied:\n");
        push_ids(&mut out, &self.new_ids);
        out
    }
}

/// Registry entries split by whether they are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Applied ids, registry order.
    pub applied: Vec<String>,
    /// Pending ids, registry order.
    pub pending: Vec<String>,
    /// Applied ids with no registry entry, sorted.
    pub unknown: Vec<String>,
    /// Number of registered migrations.
    pub total: usize,
}

impl StatusReport {
    pub fn classify<H>(registry: &MigrationRegistry<H>, applied: &HashSet<String>) -> Self {
        let (applied_ids, pending): (Vec<&str>, Vec<&str>) =
            registry.ids().partition(|id| applied.contains(*id));

        let mut unknown: Vec<String> = applied
            .iter()
            .filter(|id| !registry.contains(id))
            .cloned()
            .collect();
        unknown.sort();

        Self {
            applied: applied_ids.into_iter().map(String::from).collect(),
            pending: pending.into_iter().map(String::from).collect(),
            unknown,
            total: registry.len(),
        }
    }

    /// Every registered migration is applied and nothing else is recorded.
    pub fn is_up_to_date(&self) -> bool {
        self.applied.len() == self.total && self.pending.is_empty() && self.unknown.is_empty()
    }

    /// Render for the console.
    ///
    /// With `force` the grouped listing is printed even when up to date.
    pub fn render(&self, force: bool) -> String {
        if self.is_up_to_date() && !force {
            return "✅ All migrations are up to date.\n".to_string();
        }

        let mut out = String::from("\n=== Migration Status ===\n");
        if !self.applied.is_empty() {
            out.push_str("✅ Applied migrations:\n");
            push_ids(&mut out, &self.applied);
        }
        if !self.pending.is_empty() {
            out.push_str("\n❌ Pending migrations:\n");
            push_ids(&mut out, &self.pending);
        }
        if !self.unknown.is_empty() {
            out.push_str("\n⚠️  Unknown applied migrations:\n");
            push_ids(&mut out, &self.unknown);
        }
        out
    }
}

fn push_ids(out: &mut String, ids: &[String]) {
    for id in ids {
        let _ = writeln!(out, "  - {}", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::migration::Migration;

    fn noop(id: &str) -> Migration<()> {
        Migration::new(
            id.to_string(),
            |_: &()| Box::pin(async { Ok(()) }),
            |_: &()| Box::pin(async { Ok(()) }),
        )
    }

    fn registry(ids: &[&str]) -> MigrationRegistry<()> {
        ids.iter().map(|id| noop(id)).collect()
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_follows_registry_order() {
        let reg = registry(&["a", "b", "c"]);
        let before = Snapshot::from_iter(["a"]);
        let after = Snapshot::from_iter(["a", "c", "b"]);

        let diff = DiffReport::between(&before, &after, &reg);
        assert_eq!(diff.new_ids, vec!["b", "c"]);
        assert_eq!(
            diff.render(),
            "✅ Migration complete.\n🆕 New migrations applied:\n  - b\n  - c\n"
        );
    }

    #[test]
    fn test_diff_unregistered_ids_last() {
        let reg = registry(&["b"]);
        let diff = DiffReport::between(
            &Snapshot::default(),
            &Snapshot::from_iter(["z", "b", "x"]),
            &reg,
        );
        assert_eq!(diff.new_ids, vec!["b", "x", "z"]);
    }

    #[test]
    fn test_diff_ignores_removed_ids() {
        let reg = registry(&["a", "b"]);
        let diff = DiffReport::between(
            &Snapshot::from_iter(["a", "b"]),
            &Snapshot::from_iter(["a"]),
            &reg,
        );
        assert!(diff.is_empty());
        assert_eq!(diff.render(), "✅ Migration complete (no change)\n");
    }

    #[test]
    fn test_status_classification() {
        let reg = registry(&["a", "b", "c"]);
        let report = StatusReport::classify(&reg, &set(&["c", "a", "legacy"]));

        assert_eq!(report.applied, vec!["a", "c"]);
        assert_eq!(report.pending, vec!["b"]);
        assert_eq!(report.unknown, vec!["legacy"]);
        assert_eq!(report.total, 3);
        assert!(!report.is_up_to_date());
    }

    #[test]
    fn test_status_render_up_to_date() {
        let reg = registry(&["a"]);
        let report = StatusReport::classify(&reg, &set(&["a"]));
        assert_eq!(report.render(false), "✅ All migrations are up to date.\n");
        assert_eq!(
            report.render(true),
            "\n=== Migration Status ===\n✅ Applied migrations:\n  - a\n"
        );
    }

    #[test]
    fn test_status_render_empty_registry() {
        let report = StatusReport::classify(&registry(&[]), &HashSet::new());
        assert!(report.is_up_to_date());
        assert_eq!(report.render(false), "✅ All migrations are up to date.\n");
    }

    #[test]
    fn test_status_render_groups() {
        let reg = registry(&["a", "b"]);
        let report = StatusReport::classify(&reg, &set(&["a", "old"]));
        assert_eq!(
            report.render(false),
            "\n=== Migration Status ===\n\
             ✅ Applied migrations:\n  - a\n\
             \n❌ Pending migrations:\n  - b\n\
             \n⚠️  Unknown applied migrations:\n  - old\n"
        );
    }

    #[test]
    fn test_status_render_nothing_applied() {
        let reg = registry(&["a"]);
        let report = StatusReport::classify(&reg, &HashSet::new());
        assert_eq!(
            report.render(false),
            "\n=== Migration Status ===\n\n❌ Pending migrations:\n  - a\n"
        );
    }
}
