//! Effective configuration with full provenance
//!
//! The effective_config captures the resolved configuration plus
//! information about where each value came from.

use buildcfg_resolver::{ConfigResolver, ConfigValue, ResolvedConfig, ValueKind};
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use super::defaults::{keys, BuildType};
use super::error::ConfigError;
use super::sources::{ConfigSource, LayerStack};

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "buildcfg/effective_config@1";

/// Largest version code the Play Store accepts
pub const MAX_VERSION_CODE: i64 = 2_100_000_000;

/// Placeholder written over secret values
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a value as a secret
const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "credential",
];

const PACKAGE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$";

fn package_name_regex() -> &'static Regex {
    static PACKAGE_NAME: OnceLock<Regex> = OnceLock::new();
    PACKAGE_NAME.get_or_init(|| Regex::new(PACKAGE_NAME_PATTERN).unwrap())
}

/// Effective configuration with full provenance
///
/// Redacted values are replaced by the string `[REDACTED]` whatever their
/// resolved type; `redacted_kinds` keeps the type they had before.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The resolved configuration, secrets redacted
    pub config: BTreeMap<String, ConfigValue>,

    /// Winning layer per key
    pub provenance: BTreeMap<String, String>,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    /// Redacted keys
    pub redactions: Vec<String>,

    /// Resolved type of each redacted key
    #[serde(default)]
    pub redacted_kinds: BTreeMap<String, ValueKind>,
}

impl EffectiveConfig {
    /// Resolve the stack, validate the result and redact secrets
    pub fn build(stack: LayerStack, resolver: &ConfigResolver) -> Result<Self, ConfigError> {
        let (layers, sources) = stack.into_parts();

        let resolved = resolver.resolve(&layers)?;
        Self::validate_config(&resolved)?;

        let provenance = resolved.provenance().clone();
        let mut config = resolved.into_values();
        let redacted_kinds = Self::redact_secrets(&mut config);
        let redactions: Vec<String> = redacted_kinds.keys().cloned().collect();

        tracing::debug!(
            keys = config.len(),
            sources = sources.len(),
            redacted = redactions.len(),
            "built effective config"
        );

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            provenance,
            sources,
            redactions,
            redacted_kinds,
        })
    }

    /// Redact secrets in the config, returning each redacted key with its original type
    fn redact_secrets(config: &mut BTreeMap<String, ConfigValue>) -> BTreeMap<String, ValueKind> {
        let mut redacted = BTreeMap::new();
        for (key, value) in config.iter_mut() {
            let leaf = key.rsplit('.').next().unwrap_or(key).to_lowercase();
            if SECRET_KEYS.iter().any(|s| leaf.contains(s)) {
                redacted.insert(key.clone(), value.kind());
                *value = ConfigValue::String(REDACTED.to_string());
            }
        }
        redacted
    }

    /// Validate Android build rules on the resolved values
    fn validate_config(config: &ResolvedConfig) -> Result<(), ConfigError> {
        let compile = config.get_i64(keys::COMPILE_SDK);
        let min = config.get_i64(keys::MIN_SDK);
        let target = config.get_i64(keys::TARGET_SDK);

        for (key, level) in [
            (keys::COMPILE_SDK, compile),
            (keys::MIN_SDK, min),
            (keys::TARGET_SDK, target),
        ] {
            if let Some(level) = level {
                if level <= 0 {
                    return Err(ConfigError::ValidationError(format!(
                        "{} must be positive, got {}",
                        key, level
                    )));
                }
            }
        }

        if let (Some(min), Some(target)) = (min, target) {
            if min > target {
                return Err(ConfigError::ValidationError(format!(
                    "min_sdk ({}) must not exceed target_sdk ({})",
                    min, target
                )));
            }
        }

        if let (Some(target), Some(compile)) = (target, compile) {
            if target > compile {
                return Err(ConfigError::ValidationError(format!(
                    "target_sdk ({}) must not exceed compile_sdk ({})",
                    target, compile
                )));
            }
        }

        if let Some(code) = config.get_i64(keys::VERSION_CODE) {
            if !(1..=MAX_VERSION_CODE).contains(&code) {
                return Err(ConfigError::ValidationError(format!(
                    "version_code must be in [1, {}], got {}",
                    MAX_VERSION_CODE, code
                )));
            }
        }

        let package_name = package_name_regex();
        for key in [keys::APPLICATION_ID, keys::NAMESPACE] {
            if let Some(name) = config.get_str(key) {
                if !package_name.is_match(name) {
                    return Err(ConfigError::ValidationError(format!(
                        "{} '{}' is not a valid package name",
                        key, name
                    )));
                }
            }
        }

        if config.get_str(keys::BUILD_TYPE) == Some(BuildType::Release.as_str())
            && config.get_bool(keys::DEBUGGABLE) == Some(true)
        {
            return Err(ConfigError::ValidationError(
                "release builds must not be debuggable".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Resolved type of `key`, ignoring redaction
    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.redacted_kinds
            .get(key)
            .copied()
            .or_else(|| self.get(key).map(ConfigValue::kind))
    }

    /// Name of the layer that supplied `key`
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.provenance.get(key).map(String::as_str)
    }
}
