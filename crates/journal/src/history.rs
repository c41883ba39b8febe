//! Linear checkpoint history with a cursor

use crate::Checkpoint;
use std::fmt::Write;
use timeline_core::{HistoryError, Result, Snapshot};

/// Linear history of checkpoints
///
/// Index 0 is always the empty root checkpoint. The cursor marks the current
/// version. Committing after one or more undos drops every checkpoint past
/// the cursor; abandoned branches are not kept.
#[derive(Debug, Clone)]
pub struct History {
    /// Checkpoints, oldest first
    checkpoints: Vec<Checkpoint>,
    /// Index of the current version
    cursor: usize,
}

impl History {
    /// Create a history holding only the root checkpoint
    pub fn new() -> Self {
        Self {
            checkpoints: vec![Checkpoint::root()],
            cursor: 0,
        }
    }

    /// Index of the current version
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of checkpoints (always at least 1)
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Index of the most recent checkpoint
    pub fn last_index(&self) -> usize {
        self.checkpoints.len() - 1
    }

    /// Checkpoint at the cursor
    pub fn current(&self) -> &Checkpoint {
        &self.checkpoints[self.cursor]
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }

    /// Iterate checkpoints oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> + '_ {
        self.checkpoints.iter()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.last_index()
    }

    /// Append a new checkpoint after the cursor
    ///
    /// Checkpoints past the cursor are discarded first. Returns how many were
    /// discarded. The cursor ends on the new checkpoint.
    pub fn push(&mut self, snapshot: Snapshot, label: Option<String>) -> usize {
        let discarded = self.last_index() - self.cursor;
        self.checkpoints.truncate(self.cursor + 1);

        let checkpoint = Checkpoint::new(self.current(), snapshot, label);
        self.checkpoints.push(checkpoint);
        self.cursor = self.last_index();

        discarded
    }

    /// Move the cursor one version back, returning the new cursor
    pub fn step_back(&mut self) -> Result<usize> {
        if !self.can_undo() {
            return Err(HistoryError::NoEarlierCheckpoint);
        }
        self.cursor -= 1;
        Ok(self.cursor)
    }

    /// Move the cursor one version forward, returning the new cursor
    pub fn step_forward(&mut self) -> Result<usize> {
        if !self.can_redo() {
            return Err(HistoryError::NoLaterCheckpoint);
        }
        self.cursor += 1;
        Ok(self.cursor)
    }

    /// Render every version, one per line, marking the current one with `+`
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for index in 0..self.checkpoints.len() {
            if let Some(line) = self.describe_line(index) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Render a single version without a trailing newline
    ///
    /// Line breaks inside a label are rendered as spaces so each version
    /// stays on one line.
    pub fn describe_line(&self, index: usize) -> Option<String> {
        let checkpoint = self.checkpoints.get(index)?;
        let mut line = String::new();
        if index == self.cursor {
            line.push('+');
        }
        // Writing to a String cannot fail
        let _ = write!(line, "version {}: {}", index, checkpoint.snapshot());
        if let Some(label) = &checkpoint.label {
            let label = label.replace(|c: char| c == '\n' || c == '\r', " ");
            let _ = write!(line, " [{}]", label);
        }
        Some(line)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
