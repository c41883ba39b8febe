//! Checkpoint data structures

use smallvec::SmallVec;
use std::time::{SystemTime, UNIX_EPOCH};
use timeline_core::{Snapshot, SnapshotDiff};
use ulid::Ulid;

/// A checkpoint is one entry of the history: a snapshot plus metadata
#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// Unique ID (ULID for timestamp + uniqueness)
    pub id: Ulid,
    /// Parent checkpoint ID (None for the root)
    pub parent: Option<Ulid>,
    /// Timestamp (Unix milliseconds)
    pub ts_unix_ms: u64,
    /// Reason for checkpoint
    pub reason: CheckpointReason,
    /// Caller-supplied label
    pub label: Option<String>,
    /// Change summary relative to the parent
    pub meta: CheckpointMeta,
    /// Captured attribute state
    snapshot: Snapshot,
}

/// Reason for creating a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointReason {
    /// Empty initial state created with the controller
    Root,
    /// Explicit commit
    Commit,
}

/// Change summary of a checkpoint relative to its parent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointMeta {
    pub attrs_added: usize,
    pub attrs_removed: usize,
    pub attrs_modified: usize,
    /// Names of every changed attribute
    pub touched: SmallVec<[String; 4]>,
}

impl CheckpointMeta {
    fn from_diff(diff: &SnapshotDiff) -> Self {
        Self {
            attrs_added: diff.added.len(),
            attrs_removed: diff.removed.len(),
            attrs_modified: diff.modified.len(),
            touched: diff.touched_names().map(str::to_string).collect(),
        }
    }

    /// Total number of changed attributes
    pub fn changes(&self) -> usize {
        self.attrs_added + self.attrs_removed + self.attrs_modified
    }
}

impl Checkpoint {
    /// Create the root checkpoint (empty snapshot)
    pub fn root() -> Self {
        Self {
            id: Ulid::new(),
            parent: None,
            ts_unix_ms: current_timestamp_ms(),
            reason: CheckpointReason::Root,
            label: None,
            meta: CheckpointMeta::default(),
            snapshot: Snapshot::empty(),
        }
    }

    /// Create a commit checkpoint on top of `parent`
    pub fn new(parent: &Checkpoint, snapshot: Snapshot, label: Option<String>) -> Self {
        let diff = SnapshotDiff::diff(&parent.snapshot, &snapshot);
        Self {
            id: Ulid::new(),
            parent: Some(parent.id),
            ts_unix_ms: current_timestamp_ms(),
            reason: CheckpointReason::Commit,
            label,
            meta: CheckpointMeta::from_diff(&diff),
            snapshot,
        }
    }

    /// The captured attribute state
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_root(&self) -> bool {
        self.reason == CheckpointReason::Root
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
