//! Explicit caller locations for log lines

use std::fmt;
use std::panic::Location;

/// Source position of a debugger call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerLocation {
    file: &'static str,
    line: u32,
}

impl CallerLocation {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the caller (follows `#[track_caller]` chains)
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Last component of the file path
    pub fn file_name(&self) -> &'static str {
        self.file
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file)
    }

    /// Render as `[file/line N]`, `[file]`, `[line N]` or an empty string
    pub fn tag(&self, show_file: bool, show_line: bool) -> String {
        let mut parts = Vec::with_capacity(2);
        if show_file {
            parts.push(self.file_name().to_string());
        }
        if show_line {
            parts.push(format!("line {}", self.line));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("[{}]", parts.join("/"))
        }
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
