//! Ordered attribute namespace

use crate::value::Value;
use ahash::AHashMap;

/// Names starting with this prefix are implementation-reserved and never versioned
pub const RESERVED_PREFIX: &str = "_";

/// Check whether an attribute name is reserved
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Ordered mapping from attribute name to value
///
/// Iteration follows insertion order. Overwriting a name keeps its position;
/// removing and re-inserting a name moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    /// name -> (insertion sequence, value)
    slots: AHashMap<String, Slot>,
    /// Next insertion sequence number
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    value: Value,
}

impl Attributes {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        if let Some(slot) = self.slots.get_mut(&name) {
            return Some(std::mem::replace(&mut slot.value, value));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(name, Slot { seq, value });
        None
    }

    /// Remove a value by name
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.slots.remove(name).map(|slot| slot.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        let mut ordered: Vec<_> = self.slots.iter().collect();
        ordered.sort_unstable_by_key(|(_, slot)| slot.seq);
        ordered
            .into_iter()
            .map(|(name, slot)| (name.as_str(), &slot.value))
    }

    /// Iterate names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(name, _)| name)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
