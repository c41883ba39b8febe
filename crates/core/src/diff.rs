//! Top-level differences between two snapshots

use crate::snapshot::Snapshot;
use crate::value::Value;
use std::fmt;

/// Differences between two snapshots
///
/// Only attribute presence and top-level value equality are compared;
/// container contents are not diffed element by element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    /// Attributes present only in the new snapshot
    pub added: Vec<(String, Value)>,
    /// Attributes present only in the old snapshot
    pub removed: Vec<(String, Value)>,
    /// Attributes present in both with different values (old, new)
    pub modified: Vec<(String, Value, Value)>,
}

impl SnapshotDiff {
    /// Compute the diff between two snapshots
    pub fn diff(old: &Snapshot, new: &Snapshot) -> Self {
        let mut diff = Self::default();

        for (name, new_value) in new.iter() {
            match old.get(name) {
                None => diff.added.push((name.to_string(), new_value.clone())),
                Some(old_value) if old_value != new_value => diff.modified.push((
                    name.to_string(),
                    old_value.clone(),
                    new_value.clone(),
                )),
                Some(_) => {}
            }
        }

        for (name, old_value) in old.iter() {
            if !new.contains(name) {
                diff.removed.push((name.to_string(), old_value.clone()));
            }
        }

        diff
    }

    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of changed attributes
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Names of every changed attribute (added, then modified, then removed)
    pub fn touched_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.added
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.modified.iter().map(|(name, _, _)| name.as_str()))
            .chain(self.removed.iter().map(|(name, _)| name.as_str()))
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.added {
            writeln!(f, "+ {} = {}", name, value)?;
        }
        for (name, old, new) in &self.modified {
            writeln!(f, "~ {}: {} -> {}", name, old, new)?;
        }
        for (name, value) in &self.removed {
            writeln!(f, "- {} = {}", name, value)?;
        }
        Ok(())
    }
}
