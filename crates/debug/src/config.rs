//! Debugger configuration

use serde::{Deserialize, Serialize};

/// Debugger settings, usually loaded from the `[debug]` config section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Master switch for textual output
    pub textual: bool,
    /// Categories to show; calls tagged with none of these are hidden
    pub categories: Vec<String>,
    /// Tag lines with the caller's file name
    pub show_file: bool,
    /// Tag lines with the caller's line number
    pub show_line: bool,
}

impl DebugConfig {
    /// Textual output on, no category filter, no location tags
    pub fn enabled() -> Self {
        Self {
            textual: true,
            ..Self::default()
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, show_file: bool, show_line: bool) -> Self {
        self.show_file = show_file;
        self.show_line = show_line;
        self
    }

    /// A call passes when it has no categories or shares one with the config.
    pub fn accepts(&self, categories: &[&str]) -> bool {
        categories.is_empty()
            || categories
                .iter()
                .any(|category| self.categories.iter().any(|c| c == category))
    }
}
