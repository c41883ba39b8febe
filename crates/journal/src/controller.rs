//! Version controller: versioned attributes kept in sync with a checkpoint history
//!
//! Callers set named attributes on the controller, commit them as a checkpoint,
//! and move backward and forward through the checkpoints with undo/redo. After
//! every commit, undo and redo the versioned attributes equal the snapshot of
//! the current checkpoint.
//!
//! ```
//! use timeline_journal::VersionController;
//!
//! let mut vc = VersionController::new();
//! vc.set("x", 100);
//! vc.commit();
//! vc.set("x", 200);
//! vc.commit();
//!
//! vc.undo()?;
//! assert_eq!(vc.get("x").and_then(|v| v.as_int()), Some(100));
//! # Ok::<(), timeline_core::HistoryError>(())
//! ```

use crate::{Checkpoint, History};
use timeline_core::{is_reserved, Attributes, Result, Snapshot, SnapshotDiff, Value};
use tracing::{debug, info};

/// Checkpoint store over a set of named attributes
#[derive(Debug, Clone, Default)]
pub struct VersionController {
    /// Versioned attributes (the projected state)
    attrs: Attributes,
    /// Reserved-name attributes, never versioned
    private: Attributes,
    /// Checkpoint history and cursor
    history: History,
}

impl VersionController {
    /// Create a controller at version 0 with no attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, returning its previous value
    ///
    /// Names starting with the reserved prefix are stored but never versioned.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();

        if is_reserved(&name) {
            return self.private.set(name, value);
        }

        debug!(name = %name, kind = %value.kind(), "set attribute");
        self.attrs.set(name, value)
    }

    /// Get an attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        if is_reserved(name) {
            self.private.get(name)
        } else {
            self.attrs.get(name)
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        if is_reserved(name) {
            return self.private.remove(name);
        }

        debug!(name = %name, "remove attribute");
        self.attrs.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Versioned attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.attrs.iter()
    }

    /// Commit the current attributes as a new checkpoint
    pub fn commit(&mut self) -> &Checkpoint {
        self.commit_with(None)
    }

    /// Commit the current attributes as a new, labeled checkpoint
    pub fn commit_labeled(&mut self, label: impl Into<String>) -> &Checkpoint {
        self.commit_with(Some(label.into()))
    }

    fn commit_with(&mut self, label: Option<String>) -> &Checkpoint {
        let from = self.history.cursor();
        let snapshot = Snapshot::capture(&self.attrs);
        let discarded = self.history.push(snapshot, label);
        let to = self.history.cursor();

        self.project(from, to);

        let checkpoint = self.history.current();
        info!(
            version = to,
            id = %checkpoint.id,
            discarded,
            changes = checkpoint.meta.changes(),
            "checkpoint committed"
        );
        checkpoint
    }

    /// Move to the previous checkpoint
    ///
    /// Fails with [`HistoryError::NoEarlierCheckpoint`](timeline_core::HistoryError)
    /// at version 0, leaving everything unchanged.
    pub fn undo(&mut self) -> Result<()> {
        let from = self.history.cursor();
        let to = self.history.step_back()?;
        self.project(from, to);
        info!(from, to, "undo");
        Ok(())
    }

    /// Move to the next checkpoint
    ///
    /// Fails with [`HistoryError::NoLaterCheckpoint`](timeline_core::HistoryError)
    /// at the latest version, leaving everything unchanged.
    pub fn redo(&mut self) -> Result<()> {
        let from = self.history.cursor();
        let to = self.history.step_forward()?;
        self.project(from, to);
        info!(from, to, "redo");
        Ok(())
    }

    /// Make the versioned attributes equal the snapshot at `to`
    ///
    /// Removals happen before any value is set. Values are captured on the
    /// way out so the stored snapshot never aliases a live container.
    fn project(&mut self, from: usize, to: usize) {
        let (Some(source), Some(target)) = (self.history.get(from), self.history.get(to)) else {
            return;
        };
        let target = target.snapshot();

        let stale: Vec<String> = self
            .attrs
            .names()
            .filter(|name| !target.contains(name))
            .map(str::to_string)
            .collect();
        for name in &stale {
            if !source.snapshot().contains(name) {
                debug!(name = %name, "dropping uncommitted attribute");
            }
            self.attrs.remove(name);
        }

        for (name, value) in target.iter() {
            self.attrs.set(name, value.capture());
        }
    }

    /// Current version (cursor)
    pub fn version(&self) -> usize {
        self.history.cursor()
    }

    /// Number of checkpoints, including the root
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Checkpoint at the current version
    pub fn current(&self) -> &Checkpoint {
        self.history.current()
    }

    /// Render every version, marking the current one
    pub fn describe_versions(&self) -> String {
        self.history.describe()
    }

    /// Top-level diff between two versions, None if either is out of range
    pub fn diff(&self, from: usize, to: usize) -> Option<SnapshotDiff> {
        let old = self.history.get(from)?;
        let new = self.history.get(to)?;
        Some(SnapshotDiff::diff(old.snapshot(), new.snapshot()))
    }

    /// Uncommitted changes relative to the current checkpoint
    pub fn pending_changes(&self) -> SnapshotDiff {
        SnapshotDiff::diff(self.current().snapshot(), &Snapshot::capture(&self.attrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::{HistoryError, ListHandle, OpaqueHandle};

    fn int(vc: &VersionController, name: &str) -> Option<i64> {
        vc.get(name).and_then(Value::as_int)
    }

    #[test]
    fn test_commit_captures_attributes() {
        let mut vc = VersionController::new();
        vc.set("a", 1);
        let checkpoint = vc.commit();

        assert_eq!(checkpoint.snapshot().get("a"), Some(&Value::Int(1)));
        assert_eq!(vc.version(), 1);
        assert_eq!(vc.len(), 2);
        assert!(vc.pending_changes().is_empty());
    }

    #[test]
    fn test_commit_with_no_attributes() {
        let mut vc = VersionController::new();
        vc.commit();
        assert_eq!(vc.len(), 2);
        assert!(vc.current().snapshot().is_empty());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut vc = VersionController::new();
        vc.set("a", 1);
        vc.commit();
        vc.set("a", 2);
        vc.set("b", "two");
        vc.commit();

        vc.undo().unwrap();
        assert_eq!(int(&vc, "a"), Some(1));
        assert!(!vc.contains("b"));

        vc.redo().unwrap();
        assert_eq!(int(&vc, "a"), Some(2));
        assert_eq!(vc.get("b").and_then(Value::as_text), Some("two"));
    }

    #[test]
    fn test_bounds_leave_state_unchanged() {
        let mut vc = VersionController::new();
        assert_eq!(vc.undo(), Err(HistoryError::NoEarlierCheckpoint));

        vc.set("a", 1);
        vc.commit();
        assert_eq!(vc.redo(), Err(HistoryError::NoLaterCheckpoint));
        assert_eq!(vc.version(), 1);
        assert_eq!(vc.len(), 2);
        assert_eq!(int(&vc, "a"), Some(1));
    }

    #[test]
    fn test_reserved_names_are_not_versioned() {
        let mut vc = VersionController::new();
        vc.set("_scratch", 5);
        vc.set("a", 1);
        vc.commit();

        assert!(!vc.current().snapshot().contains("_scratch"));
        assert_eq!(vc.attributes().count(), 1);

        vc.undo().unwrap();
        assert_eq!(int(&vc, "_scratch"), Some(5));
        assert!(!vc.contains("a"));

        assert_eq!(vc.remove("_scratch"), Some(Value::Int(5)));
        assert!(!vc.contains("_scratch"));
    }

    #[test]
    fn test_in_place_mutation_does_not_reach_history() {
        let mut vc = VersionController::new();
        vc.set("items", vec![Value::Int(1)]);
        vc.commit();

        // Mutate the live list after commit
        vc.get("items").and_then(Value::as_list).unwrap().push(2);
        assert_eq!(vc.current().snapshot().get("items").unwrap().as_list().unwrap().len(), 1);
        assert_eq!(vc.pending_changes().modified.len(), 1);

        // Mutate the projected list after undo/redo
        vc.set("x", 0);
        vc.commit();
        vc.undo().unwrap();
        vc.get("items").and_then(Value::as_list).unwrap().push(3);
        vc.redo().unwrap();

        // Version 2 holds the list as it was at the second commit
        let items = vc.get("items").and_then(Value::as_list).unwrap();
        assert_eq!(items.len(), 2);

        let first = vc.history().get(1).unwrap().snapshot();
        assert_eq!(first.get("items").unwrap().as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_caller_handle_is_detached_after_commit() {
        let list = ListHandle::from_vec(vec![Value::Int(1)]);
        let mut vc = VersionController::new();
        vc.set("items", list.clone());
        vc.commit();

        list.push(2);

        assert_eq!(vc.get("items").and_then(Value::as_list).unwrap().len(), 1);
    }

    #[test]
    fn test_opaque_values_are_shared() {
        let handle = OpaqueHandle::new(vec![1u8, 2, 3]);
        let mut vc = VersionController::new();
        vc.set("blob", handle.clone());
        vc.commit();
        vc.set("blob", Value::Null);
        vc.commit();
        vc.undo().unwrap();

        let restored = vc.get("blob").and_then(Value::as_opaque).unwrap();
        assert!(restored.ptr_eq(&handle));
    }

    #[test]
    fn test_undo_discards_uncommitted_attributes() {
        let mut vc = VersionController::new();
        vc.set("a", 1);
        vc.commit();
        vc.set("b", 2);
        vc.commit();

        vc.set("draft", 3);
        vc.set("a", 100);
        vc.undo().unwrap();

        assert!(!vc.contains("draft"));
        assert_eq!(int(&vc, "a"), Some(1));
        assert!(vc.pending_changes().is_empty());
    }

    #[test]
    fn test_diff_between_versions() {
        let mut vc = VersionController::new();
        vc.set("a", 1);
        vc.commit();
        vc.set("b", 2);
        vc.commit();

        let diff = vc.diff(1, 2).unwrap();
        assert_eq!(diff.added, vec![("b".to_string(), Value::Int(2))]);
        assert!(vc.diff(0, 3).is_none());
    }

    #[test]
    fn test_nan_commit_has_no_pending_changes() {
        let mut vc = VersionController::new();
        vc.set("x", f64::NAN);
        vc.commit();
        assert!(vc.pending_changes().is_empty());

        let checkpoint = vc.commit();
        assert_eq!(checkpoint.meta.changes(), 0);
        assert!(checkpoint.meta.touched.is_empty());

        vc.undo().unwrap();
        assert!(vc.pending_changes().is_empty());
    }

    #[test]
    fn test_describe_self_containing_list() {
        let list = ListHandle::new();
        list.push(Value::List(list.clone()));

        let mut vc = VersionController::new();
        vc.set("l", list);
        vc.commit();

        let described = vc.describe_versions();
        assert_eq!(described, "version 0: {}\n+version 1: {l: [[[...]]]}\n");
        assert!(vc.pending_changes().is_empty());
    }

    #[test]
    fn test_labeled_commit() {
        let mut vc = VersionController::new();
        vc.set("a", 1);
        vc.commit_labeled("first");
        assert_eq!(vc.current().label.as_deref(), Some("first"));
        assert!(vc.describe_versions().contains("[first]"));
    }
}
