//! Differences between two snapshots

use crate::snapshot::Snapshot;
use funnel_core::{Change, Operation, SourceEntry};

/// Differences between two snapshots
#[derive(Debug, Clone, Default)]
pub struct TreeDiff {
    /// Entries gone from the new snapshot (or whose kind flipped), children first
    pub removed: Vec<SourceEntry>,
    /// Entries new in the new snapshot (or whose kind flipped), parents first
    pub added: Vec<SourceEntry>,
    /// Files present in both with different size or mtime
    pub modified: Vec<SourceEntry>,
}

impl TreeDiff {
    /// Compute the diff between two snapshots
    pub fn diff(old: &Snapshot, new: &Snapshot) -> Self {
        let mut diff = Self::default();

        for old_entry in old.iter() {
            match new.get(&old_entry.relative_path) {
                Some(new_entry) if new_entry.kind == old_entry.kind => {}
                _ => diff.removed.push(old_entry.clone()),
            }
        }
        // Sorted ascending, so reversing puts children ahead of parents
        diff.removed.reverse();

        for new_entry in new.iter() {
            match old.get(&new_entry.relative_path) {
                None => diff.added.push(new_entry.clone()),
                Some(old_entry) if old_entry.kind != new_entry.kind => {
                    diff.added.push(new_entry.clone())
                }
                Some(old_entry) if new_entry.differs_from(old_entry) => {
                    diff.modified.push(new_entry.clone())
                }
                Some(_) => {}
            }
        }

        diff
    }

    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Flatten into an ordered change-list
    ///
    /// All removals come first (children before parents), then additions and
    /// modifications in path order (parents before children).
    pub fn into_changes(self) -> Vec<Change> {
        let mut changes = Vec::with_capacity(self.removed.len() + self.added.len() + self.modified.len());

        for entry in self.removed {
            let operation = if entry.is_directory() {
                Operation::Rmdir
            } else {
                Operation::Unlink
            };
            changes.push(Change::new(operation, entry));
        }

        let mut upserts: Vec<Change> = self
            .added
            .into_iter()
            .map(|entry| {
                let operation = if entry.is_directory() {
                    Operation::Mkdir
                } else {
                    Operation::Create
                };
                Change::new(operation, entry)
            })
            .chain(
                self.modified
                    .into_iter()
                    .map(|entry| Change::new(Operation::Change, entry)),
            )
            .collect();
        upserts.sort_by(|a, b| a.entry.relative_path.cmp(&b.entry.relative_path));

        changes.extend(upserts);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn ops(changes: &[Change]) -> Vec<(String, String)> {
        changes
            .iter()
            .map(|c| (c.operation.to_string(), c.entry.relative_path.clone()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(op, path)| (op.to_string(), path.to_string()))
            .collect()
    }

    #[test]
    fn test_diff_from_empty_is_parents_first() {
        let mut new = Snapshot::new();
        new.insert(SourceEntry::file("a.txt", 1, at(1)));
        new.insert(SourceEntry::directory("sub"));
        new.insert(SourceEntry::file("sub/b.txt", 1, at(1)));

        let changes = TreeDiff::diff(&Snapshot::new(), &new).into_changes();
        assert_eq!(
            ops(&changes),
            pairs(&[("create", "a.txt"), ("mkdir", "sub"), ("create", "sub/b.txt")])
        );
    }

    #[test]
    fn test_diff_removals_are_children_first() {
        let mut old = Snapshot::new();
        old.insert(SourceEntry::directory("sub"));
        old.insert(SourceEntry::directory("sub/deep"));
        old.insert(SourceEntry::file("sub/deep/x.txt", 1, at(1)));
        old.insert(SourceEntry::file("sub/y.txt", 1, at(1)));

        let changes = TreeDiff::diff(&old, &Snapshot::new()).into_changes();
        assert_eq!(
            ops(&changes),
            pairs(&[
                ("unlink", "sub/y.txt"),
                ("unlink", "sub/deep/x.txt"),
                ("rmdir", "sub/deep"),
                ("rmdir", "sub"),
            ])
        );
    }

    #[test]
    fn test_diff_detects_modification() {
        let mut old = Snapshot::new();
        old.insert(SourceEntry::file("a.txt", 1, at(1)));
        old.insert(SourceEntry::file("b.txt", 1, at(1)));

        let mut new = Snapshot::new();
        new.insert(SourceEntry::file("a.txt", 1, at(2)));
        new.insert(SourceEntry::file("b.txt", 1, at(1)));

        let diff = TreeDiff::diff(&old, &new);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(ops(&diff.into_changes()), pairs(&[("change", "a.txt")]));
    }

    #[test]
    fn test_diff_kind_flip() {
        let mut old = Snapshot::new();
        old.insert(SourceEntry::file("x", 1, at(1)));

        let mut new = Snapshot::new();
        new.insert(SourceEntry::directory("x"));
        new.insert(SourceEntry::file("x/inner", 1, at(1)));

        let changes = TreeDiff::diff(&old, &new).into_changes();
        assert_eq!(
            ops(&changes),
            pairs(&[("unlink", "x"), ("mkdir", "x"), ("create", "x/inner")])
        );
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SourceEntry::directory("d"));
        snapshot.insert(SourceEntry::file("d/f", 4, at(3)));

        let diff = TreeDiff::diff(&snapshot, &snapshot.clone());
        assert!(diff.is_empty());
        assert!(diff.into_changes().is_empty());
    }
}
