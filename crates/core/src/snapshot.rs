//! Snapshot representation for committed attribute state

use crate::attrs::{is_reserved, Attributes};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A snapshot captures every versioned attribute at a point in time
///
/// Snapshots are immutable once built. Container values inside a snapshot are
/// private captures; callers reading them must not mutate through the handles
/// they get back, or the snapshot stops describing what was committed.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Entries in insertion order (names unique)
    entries: Vec<(String, Value)>,
}

impl Snapshot {
    /// The empty snapshot (root of every history)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the versioned part of an attribute namespace
    ///
    /// Reserved names are skipped and every value goes through
    /// [`Value::capture`].
    pub fn capture(attrs: &Attributes) -> Self {
        let entries = attrs
            .iter()
            .filter(|(name, _)| !is_reserved(name))
            .map(|(name, value)| (name.to_string(), value.capture()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Build a snapshot from pairs; a repeated name overwrites in place
impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut entries: Vec<(String, Value)> = Vec::new();
        for (name, value) in iter {
            match entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => entries.push((name, value)),
            }
        }
        Self { entries }
    }
}

/// Equality is by name and value; entry order does not matter
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("}")
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
