//! Configuration value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single configuration value.
///
/// Serializes as the bare JSON scalar (`"1.0.0"`, `36`, `true`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

/// Runtime type tag of a [`ConfigValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Boolean,
}

impl ConfigValue {
    /// The runtime type of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::String(_) => ValueKind::String,
            ConfigValue::Integer(_) => ValueKind::Integer,
            ConfigValue::Boolean(_) => ValueKind::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Integer(i) => serde_json::Value::Number((*i).into()),
            ConfigValue::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "{}", s),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Integer(i64::from(i))
    }
}

impl From<u32> for ConfigValue {
    fn from(i: u32) -> Self {
        ConfigValue::Integer(i64::from(i))
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(ValueKind::String),
            "integer" | "int" => Ok(ValueKind::Integer),
            "boolean" | "bool" => Ok(ValueKind::Boolean),
            other => Err(format!(
                "unknown value kind '{}' (expected string, integer or boolean)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(ConfigValue::from("x").kind(), ValueKind::String);
        assert_eq!(ConfigValue::from(36).kind(), ValueKind::Integer);
        assert_eq!(ConfigValue::from(true).kind(), ValueKind::Boolean);
    }

    #[test]
    fn test_accessors_are_type_strict() {
        let v = ConfigValue::from("36");
        assert_eq!(v.as_str(), Some("36"));
        assert_eq!(v.as_i64(), None);
        assert_eq!(v.as_bool(), None);
    }

    #[test]
    fn test_serializes_as_bare_scalar() {
        assert_eq!(serde_json::to_string(&ConfigValue::from(25)).unwrap(), "25");
        assert_eq!(serde_json::to_string(&ConfigValue::from(false)).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&ConfigValue::from("1.0.0")).unwrap(),
            "\"1.0.0\""
        );
    }

    #[test]
    fn test_deserialize_keeps_type() {
        let v: ConfigValue = serde_json::from_str("\"true\"").unwrap();
        assert_eq!(v, ConfigValue::String("true".to_string()));
        let v: ConfigValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ConfigValue::Boolean(true));
        let v: ConfigValue = serde_json::from_str("17").unwrap();
        assert_eq!(v, ConfigValue::Integer(17));
    }

    #[test]
    fn test_value_kind_from_str() {
        assert_eq!("integer".parse::<ValueKind>().unwrap(), ValueKind::Integer);
        assert_eq!("Bool".parse::<ValueKind>().unwrap(), ValueKind::Boolean);
        assert!("float".parse::<ValueKind>().is_err());
    }
}
