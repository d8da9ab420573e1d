//! Turning structured documents and raw text into layers
//!
//! - Tables/objects: flattened to dot-separated keys
//! - Strings, integers, booleans: kept as-is
//! - Floats, arrays, datetimes, nulls: rejected

use buildcfg_resolver::{ConfigLayer, ConfigValue, ValueKind};
use serde_json::Value;

use super::error::ConfigError;

/// Flatten a TOML table into a layer named `name`.
pub fn flatten_toml(name: &str, table: toml::Table) -> Result<ConfigLayer, ConfigError> {
    let mut layer = ConfigLayer::new(name);
    for (key, value) in table {
        flatten_toml_into(&key, value, &mut layer)?;
    }
    Ok(layer)
}

fn flatten_toml_into(
    path: &str,
    value: toml::Value,
    layer: &mut ConfigLayer,
) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(s) => {
            layer.set(path, s);
        }
        toml::Value::Integer(i) => {
            layer.set(path, i);
        }
        toml::Value::Boolean(b) => {
            layer.set(path, b);
        }
        toml::Value::Table(table) => {
            for (key, nested) in table {
                flatten_toml_into(&join_key(path, &key), nested, layer)?;
            }
        }
        toml::Value::Float(_) => return Err(unsupported(path, "float")),
        toml::Value::Datetime(_) => return Err(unsupported(path, "datetime")),
        toml::Value::Array(_) => return Err(unsupported(path, "array")),
    }
    Ok(())
}

/// Flatten a JSON object into a layer named `name`.
pub fn flatten_json(name: &str, value: Value) -> Result<ConfigLayer, ConfigError> {
    let Value::Object(map) = value else {
        return Err(ConfigError::ParseError(format!(
            "layer '{}' must be a JSON object",
            name
        )));
    };

    let mut layer = ConfigLayer::new(name);
    for (key, value) in map {
        flatten_json_into(&key, value, &mut layer)?;
    }
    Ok(layer)
}

fn flatten_json_into(path: &str, value: Value, layer: &mut ConfigLayer) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => {
            layer.set(path, s);
        }
        Value::Bool(b) => {
            layer.set(path, b);
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                layer.set(path, i);
            }
            None => return Err(unsupported(path, "non-integer number")),
        },
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_json_into(&join_key(path, &key), nested, layer)?;
            }
        }
        Value::Array(_) => return Err(unsupported(path, "array")),
        Value::Null => return Err(unsupported(path, "null")),
    }
    Ok(())
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn unsupported(key: &str, kind: &'static str) -> ConfigError {
    ConfigError::UnsupportedValue {
        key: key.to_string(),
        kind,
    }
}

/// Interpret a raw text value.
///
/// `true`/`false` become booleans, anything `i64` parses becomes an
/// integer, a double-quoted value is always a string.
pub fn parse_scalar(raw: &str) -> ConfigValue {
    let trimmed = raw.trim();

    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return ConfigValue::String(trimmed[1..trimmed.len() - 1].to_string());
    }

    match trimmed {
        "true" => return ConfigValue::Boolean(true),
        "false" => return ConfigValue::Boolean(false),
        _ => {}
    }

    match trimmed.parse::<i64>() {
        Ok(i) => ConfigValue::Integer(i),
        Err(_) => ConfigValue::String(trimmed.to_string()),
    }
}

/// Parse a `KEY=VALUE` override.
pub fn parse_override(raw: &str) -> Result<(String, ConfigValue), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }

    Ok((key.to_string(), parse_scalar(value)))
}

/// Parse a `KEY=KIND` type expectation.
pub fn parse_expectation(raw: &str) -> Result<(String, ValueKind), ConfigError> {
    let invalid = || ConfigError::InvalidExpectation(raw.to_string());

    let (key, kind) = raw.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }
    let kind = kind.trim().parse::<ValueKind>().map_err(|_| invalid())?;

    Ok((key.to_string(), kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_toml_nested_tables() {
        let table: toml::Table = toml::from_str(
            r#"
            compile_sdk = 35
            [kotlin]
            jvm_target = "17"
            [java]
            source_compatibility = "17"
            "#,
        )
        .unwrap();

        let layer = flatten_toml("project", table).unwrap();

        assert_eq!(layer.name, "project");
        assert_eq!(layer.get("compile_sdk"), Some(&ConfigValue::Integer(35)));
        assert_eq!(layer.get("kotlin.jvm_target"), Some(&ConfigValue::from("17")));
        assert_eq!(
            layer.get("java.source_compatibility"),
            Some(&ConfigValue::from("17"))
        );
        assert!(!layer.contains_key("kotlin"));
    }

    #[test]
    fn test_flatten_toml_rejects_array() {
        let table: toml::Table = toml::from_str(r#"plugins = ["kotlin-android"]"#).unwrap();
        let err = flatten_toml("project", table).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedValue { ref key, kind: "array" } if key == "plugins"
        ));
    }

    #[test]
    fn test_flatten_toml_rejects_float_in_nested_table() {
        let table: toml::Table = toml::from_str("[signing]\nratio = 0.5").unwrap();
        let err = flatten_toml("host", table).unwrap_err();
        assert!(err.to_string().contains("signing.ratio"));
    }

    #[test]
    fn test_flatten_json() {
        let layer = flatten_json(
            "cli",
            json!({
                "min_sdk": 26,
                "debuggable": true,
                "flutter": {"source": "../.."}
            }),
        )
        .unwrap();

        assert_eq!(layer.get("min_sdk"), Some(&ConfigValue::Integer(26)));
        assert_eq!(layer.get("debuggable"), Some(&ConfigValue::Boolean(true)));
        assert_eq!(layer.get("flutter.source"), Some(&ConfigValue::from("../..")));
    }

    #[test]
    fn test_flatten_json_rejects_null_and_non_object() {
        assert!(matches!(
            flatten_json("x", json!({"a": null})),
            Err(ConfigError::UnsupportedValue { kind: "null", .. })
        ));
        assert!(matches!(
            flatten_json("x", json!({"a": 1.5})),
            Err(ConfigError::UnsupportedValue { .. })
        ));
        assert!(matches!(
            flatten_json("x", json!([1, 2])),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("true"), ConfigValue::Boolean(true));
        assert_eq!(parse_scalar("false"), ConfigValue::Boolean(false));
        assert_eq!(parse_scalar("36"), ConfigValue::Integer(36));
        assert_eq!(parse_scalar("-4"), ConfigValue::Integer(-4));
        assert_eq!(parse_scalar("1.0.0"), ConfigValue::from("1.0.0"));
        assert_eq!(parse_scalar("True"), ConfigValue::from("True"));
        assert_eq!(parse_scalar(" 25 "), ConfigValue::Integer(25));
    }

    #[test]
    fn test_parse_scalar_quoted_is_string() {
        assert_eq!(parse_scalar("\"17\""), ConfigValue::from("17"));
        assert_eq!(parse_scalar("\"true\""), ConfigValue::from("true"));
        assert_eq!(parse_scalar("\"\""), ConfigValue::from(""));
    }

    #[test]
    fn test_parse_override() {
        let (key, value) = parse_override("version_name=1.2.3").unwrap();
        assert_eq!(key, "version_name");
        assert_eq!(value, ConfigValue::from("1.2.3"));

        let (key, value) = parse_override("signing.store_file=a=b").unwrap();
        assert_eq!(key, "signing.store_file");
        assert_eq!(value, ConfigValue::from("a=b"));
    }

    #[test]
    fn test_parse_expectation() {
        assert_eq!(
            parse_expectation("min_sdk=integer").unwrap(),
            ("min_sdk".to_string(), ValueKind::Integer)
        );
        assert_eq!(
            parse_expectation("debuggable = bool").unwrap(),
            ("debuggable".to_string(), ValueKind::Boolean)
        );
    }

    #[test]
    fn test_parse_expectation_invalid() {
        for raw in ["min_sdk", "min_sdk=float", "=string"] {
            let err = parse_expectation(raw).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidExpectation(_)), "{}", raw);
            assert!(err.to_string().contains("KEY=string|integer|boolean"));
        }
    }

    #[test]
    fn test_parse_override_invalid() {
        assert!(matches!(
            parse_override("no_equals"),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(matches!(
            parse_override("=value"),
            Err(ConfigError::InvalidOverride(_))
        ));
    }
}
