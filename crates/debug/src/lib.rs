//! Console debugger for Timeline sessions
//!
//! A small structured logger independent of the checkpoint store:
//! - Nested timing regions (`log_start` / `log_end`)
//! - Category filters
//! - Optional caller file/line tags via `#[track_caller]`

pub mod config;
pub mod debugger;
pub mod error;
pub mod location;

pub use config::DebugConfig;
pub use debugger::Debugger;
pub use error::DebugError;
pub use location::CallerLocation;

/// Result type for debugger operations
pub type Result<T> = std::result::Result<T, DebugError>;
