//! History error types

use thiserror::Error;

/// Errors surfaced by checkpoint navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Undo was called while the cursor is at the root checkpoint.
    #[error("no earlier checkpoint exists (already at version 0)")]
    NoEarlierCheckpoint,

    /// Redo was called while the cursor is at the most recent checkpoint.
    #[error("no later checkpoint exists (already at the latest version)")]
    NoLaterCheckpoint,
}
