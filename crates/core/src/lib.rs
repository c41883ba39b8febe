//! Timeline Core - value model and snapshot primitives for the Timeline checkpoint store
//!
//! This crate provides the foundational data layer:
//! - Attribute values with an explicit capture (copy) policy
//! - Ordered attribute namespace with reserved names
//! - Immutable snapshots and top-level snapshot diffing
//! - History error types

pub mod attrs;
pub mod diff;
pub mod error;
pub mod snapshot;
pub mod value;

// Re-export main types for convenience
pub use attrs::{is_reserved, Attributes, RESERVED_PREFIX};
pub use diff::SnapshotDiff;
pub use error::HistoryError;
pub use snapshot::Snapshot;
pub use value::{ListHandle, MapHandle, OpaqueHandle, Value, ValueKind};

/// Common result type used throughout timeline crates
pub type Result<T> = std::result::Result<T, HistoryError>;
