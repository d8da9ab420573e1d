//! Deterministic resolver for layered build settings.
//!
//! Layers are merged lowest precedence first with last-writer-wins
//! semantics, then the merged mapping is checked for required keys and
//! expected value types. Resolution is a pure function of its inputs.

mod error;
mod layer;
mod resolved;
mod value;

pub use error::ResolveError;
pub use layer::ConfigLayer;
pub use resolved::ResolvedConfig;
pub use value::{ConfigValue, ValueKind};

use std::collections::{BTreeMap, BTreeSet};

/// Merge `layers` and check that every key in `required_keys` is defined.
pub fn resolve(
    layers: &[ConfigLayer],
    required_keys: &BTreeSet<String>,
) -> Result<ResolvedConfig, ResolveError> {
    resolve_with_types(layers, required_keys, &BTreeMap::new())
}

/// Merge `layers`, check required keys, then check value types.
///
/// Keys in `expected_types` that no layer defines are skipped; list them
/// in `required_keys` to make them mandatory.
pub fn resolve_with_types(
    layers: &[ConfigLayer],
    required_keys: &BTreeSet<String>,
    expected_types: &BTreeMap<String, ValueKind>,
) -> Result<ResolvedConfig, ResolveError> {
    if layers.is_empty() {
        return Err(ResolveError::EmptyLayerSet);
    }

    let mut values: BTreeMap<String, ConfigValue> = BTreeMap::new();
    let mut provenance: BTreeMap<String, String> = BTreeMap::new();

    for layer in layers {
        tracing::trace!(layer = %layer.name, entries = layer.len(), "merging layer");
        for (key, value) in layer {
            values.insert(key.clone(), value.clone());
            provenance.insert(key.clone(), layer.name.clone());
        }
    }

    if let Some(missing) = required_keys.iter().find(|k| !values.contains_key(*k)) {
        return Err(ResolveError::MissingRequiredKey(missing.clone()));
    }

    for (key, expected) in expected_types {
        if let Some(value) = values.get(key) {
            let actual = value.kind();
            if actual != *expected {
                return Err(ResolveError::TypeMismatch {
                    key: key.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }
    }

    let layer_names = layers.iter().map(|l| l.name.clone()).collect();
    tracing::debug!(
        layers = layers.len(),
        keys = values.len(),
        "resolved configuration"
    );

    Ok(ResolvedConfig::new(values, provenance, layer_names))
}

/// Reusable resolver carrying its validation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigResolver {
    required_keys: BTreeSet<String>,
    expected_types: BTreeMap<String, ValueKind>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as required.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        self.required_keys.insert(key.into());
        self
    }

    /// Mark every key in `keys` as required.
    pub fn require_all<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Expect `key`, when present, to hold a value of `kind`.
    pub fn expect_type(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.expected_types.insert(key.into(), kind);
        self
    }

    pub fn required_keys(&self) -> &BTreeSet<String> {
        &self.required_keys
    }

    pub fn expected_types(&self) -> &BTreeMap<String, ValueKind> {
        &self.expected_types
    }

    pub fn resolve(&self, layers: &[ConfigLayer]) -> Result<ResolvedConfig, ResolveError> {
        resolve_with_types(layers, &self.required_keys, &self.expected_types)
    }
}
