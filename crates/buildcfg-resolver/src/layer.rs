//! Configuration layers.

use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// One named source of configuration key-value pairs.
///
/// Position in the sequence handed to the resolver decides precedence;
/// the layer itself carries no priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    /// Layer name, recorded as provenance for the keys it wins.
    pub name: String,

    /// Key-value pairs defined by this layer.
    #[serde(default)]
    pub entries: BTreeMap<String, ConfigValue>,
}

impl ConfigLayer {
    /// Create an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ConfigLayer {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let layer = ConfigLayer::new("defaults")
            .with("compile_sdk", 36)
            .with("version_name", "1.0.0")
            .with("debuggable", false);

        assert_eq!(layer.name, "defaults");
        assert_eq!(layer.len(), 3);
        assert_eq!(layer.get("compile_sdk"), Some(&ConfigValue::Integer(36)));
        assert!(layer.contains_key("debuggable"));
        assert!(!layer.contains_key("min_sdk"));
    }

    #[test]
    fn test_set_replaces_within_layer() {
        let mut layer = ConfigLayer::new("cli");
        assert!(layer.set("min_sdk", 21).is_none());
        let previous = layer.set("min_sdk", 25);
        assert_eq!(previous, Some(ConfigValue::Integer(21)));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let layer = ConfigLayer::new("x").with("b", 1).with("a", 2).with("c", 3);
        let keys: Vec<&str> = layer.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
