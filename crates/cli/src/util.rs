//! Shared utilities for CLI commands

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use timeline_core::{SnapshotDiff, Value};
use ulid::Ulid;

/// Convert a parsed JSON literal into an attribute value
///
/// Arrays become lists and objects become maps. Integers that do not fit in
/// an `i64` are stored as floats.
pub fn value_from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => {
            Value::from(items.into_iter().map(value_from_json).collect::<Vec<_>>())
        }
        serde_json::Value::Object(entries) => Value::from(
            entries
                .into_iter()
                .map(|(key, item)| (key, value_from_json(item)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

/// Last eight characters of a checkpoint id (the random part)
pub fn short_id(id: &Ulid) -> String {
    let full = id.to_string();
    full[full.len() - 8..].to_string()
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts_ms: u64) -> String {
    let now = Utc::now().timestamp_millis();
    let elapsed_ms = now - ts_ms as i64;
    if elapsed_ms < 0 {
        return "in the future".to_string();
    }

    let seconds = elapsed_ms / 1000;
    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else {
        format!("{} days ago", seconds / 86400)
    }
}

/// Format timestamp as absolute UTC time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{}ms", ts_ms))
}

/// Optional coloring for session output
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn added(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn removed(&self, text: &str) -> String {
        self.paint(text, |t| t.red().to_string())
    }

    pub fn modified(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn name(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().to_string())
    }

    pub fn dimmed(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }

    pub fn current(&self, text: &str) -> String {
        self.paint(text, |t| t.bold().to_string())
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }

    /// Render a diff one line per change, colored by change kind
    pub fn diff(&self, diff: &SnapshotDiff) -> String {
        let mut out = String::new();
        for (name, value) in &diff.added {
            out.push_str(&self.added(&format!("+ {} = {}", name, value)));
            out.push('\n');
        }
        for (name, old, new) in &diff.modified {
            out.push_str(&self.modified(&format!("~ {}: {} -> {}", name, old, new)));
            out.push('\n');
        }
        for (name, value) in &diff.removed {
            out.push_str(&self.removed(&format!("- {} = {}", name, value)));
            out.push('\n');
        }
        out
    }
}
