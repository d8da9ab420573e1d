//! The resolved configuration record.

use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Immutable result of merging an ordered set of layers.
///
/// Holds exactly one value per key: the one from the last layer that
/// defines it. Fields are private; the record is only produced by the
/// resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    values: BTreeMap<String, ConfigValue>,
    provenance: BTreeMap<String, String>,
    layers: Vec<String>,
}

impl ResolvedConfig {
    pub(crate) fn new(
        values: BTreeMap<String, ConfigValue>,
        provenance: BTreeMap<String, String>,
        layers: Vec<String>,
    ) -> Self {
        Self {
            values,
            provenance,
            layers,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Name of the layer that supplied the value for `key`.
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.provenance.get(key).map(String::as_str)
    }

    /// Names of all input layers, lowest precedence first.
    pub fn layer_names(&self) -> &[String] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate key-value pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.values.iter()
    }

    pub fn values(&self) -> &BTreeMap<String, ConfigValue> {
        &self.values
    }

    pub fn provenance(&self) -> &BTreeMap<String, String> {
        &self.provenance
    }

    /// Flat JSON object of the resolved values.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Consume the record, keeping only the values.
    pub fn into_values(self) -> BTreeMap<String, ConfigValue> {
        self.values
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
