//! Checkpoint history and version control
//!
//! This crate provides:
//! - Checkpoint data structures (ULID-based IDs, change metadata)
//! - Linear history with a cursor and destructive branch truncation
//! - `VersionController`, the checkpoint store that keeps versioned
//!   attributes synchronized with the current checkpoint

pub mod checkpoint;
pub mod controller;
pub mod history;

// Re-exports
pub use checkpoint::{Checkpoint, CheckpointMeta, CheckpointReason};
pub use controller::VersionController;
pub use history::History;

/// Result type for history operations
pub type Result<T> = timeline_core::Result<T>;
