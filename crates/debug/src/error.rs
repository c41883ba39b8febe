//! Debugger error types

use crate::CallerLocation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebugError {
    /// `log_end` was called with no region open.
    #[error("there is no open region to end (called at {location})")]
    NoOpenRegion { location: CallerLocation },

    #[error("failed to write debug output: {0}")]
    Io(#[from] std::io::Error),
}
