//! Resolution errors.

use crate::value::ValueKind;
use serde::{Deserialize, Serialize};

/// Reasons a set of layers cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", content = "detail")]
pub enum ResolveError {
    /// No layers were supplied.
    #[serde(rename = "EMPTY_LAYER_SET")]
    #[error("no configuration layers supplied")]
    EmptyLayerSet,

    /// A required key is not defined by any layer.
    #[serde(rename = "MISSING_REQUIRED_KEY")]
    #[error("missing required key '{0}'")]
    MissingRequiredKey(String),

    /// A value's runtime type differs from the expected one.
    #[serde(rename = "TYPE_MISMATCH")]
    #[error("key '{key}' has type {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

impl ResolveError {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            ResolveError::EmptyLayerSet => "EMPTY_LAYER_SET".to_string(),
            ResolveError::MissingRequiredKey(k) => format!("MISSING_REQUIRED_KEY:{}", k),
            ResolveError::TypeMismatch {
                key,
                expected,
                actual,
            } => format!("TYPE_MISMATCH:{}:{}!={}", key, expected, actual),
        }
    }
}
