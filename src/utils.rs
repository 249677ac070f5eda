//! Small shared helpers

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A map keyed by name that remembers first-insertion order.
///
/// Replacing an existing entry keeps its original position.
#[derive(Debug, Clone)]
pub struct NamedMap<V> {
    order: Vec<String>,
    entries: HashMap<String, V>,
}

impl<V> NamedMap<V> {
    pub fn new() -> Self {
        NamedMap {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Insert or replace an entry, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        if !self.entries.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.entries.insert(name, value)
    }

    /// Insert or replace an entry, returning the stored value
    pub fn set(&mut self, name: impl Into<String>, value: V) -> &mut V {
        match self.entries.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(value)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in first-insertion order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Entries in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|value| (name.as_str(), value)))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<V> Default for NamedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the plural or singular suffix for `count`
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
