//! Layer sources with provenance
//!
//! Precedence, lowest first: builtin defaults, build-type overlay, host
//! file, project file, environment, CLI overrides. A config file may carry
//! a `[build_types.<name>]` table that is applied right after the file.

use buildcfg_resolver::ConfigLayer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::{BuildType, BuiltinDefaults};
use super::error::ConfigError;
use super::flatten::{flatten_toml, parse_override, parse_scalar};

/// Table holding per-build-type overrides inside a config file
pub const BUILD_TYPES_TABLE: &str = "build_types";

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "BUILDCFG_";

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOrigin {
    Builtin,
    BuildType,
    Host,
    Project,
    Env,
    Cli,
}

impl ConfigOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigOrigin::Builtin => "builtin",
            ConfigOrigin::BuildType => "build_type",
            ConfigOrigin::Host => "host",
            ConfigOrigin::Project => "project",
            ConfigOrigin::Env => "env",
            ConfigOrigin::Cli => "cli",
        }
    }
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// Name of the layer it produced
    pub layer: String,

    /// File path (None for builtin/build_type/env/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Ordered layers plus the provenance of each
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<ConfigLayer>,
    sources: Vec<ConfigSource>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer on top of the stack.
    pub fn push(
        &mut self,
        origin: ConfigOrigin,
        layer: ConfigLayer,
        path: Option<String>,
        digest: Option<String>,
    ) {
        tracing::debug!(
            origin = origin.as_str(),
            layer = %layer.name,
            entries = layer.len(),
            "pushing config layer"
        );
        self.sources.push(ConfigSource {
            origin,
            layer: layer.name.clone(),
            path,
            digest,
        });
        self.layers.push(layer);
    }

    /// Layer 1: built-in defaults
    pub fn push_builtin(&mut self, defaults: &BuiltinDefaults) {
        self.push(ConfigOrigin::Builtin, defaults.to_layer(), None, None);
    }

    /// Layer 2: build-type overlay
    pub fn push_build_type(&mut self, build_type: BuildType) {
        self.push(ConfigOrigin::BuildType, build_type.overlay(), None, None);
    }

    /// Host/project TOML file, plus its build-type table if present.
    ///
    /// Returns false when the file does not exist.
    pub fn push_file(
        &mut self,
        origin: ConfigOrigin,
        path: &Path,
        build_type: Option<BuildType>,
    ) -> Result<bool, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, skipping");
            return Ok(false);
        }

        let (mut table, digest) = load_toml_file(path)?;
        let path_str = path.to_string_lossy().to_string();

        let build_types = table.remove(BUILD_TYPES_TABLE);
        let name = origin.as_str();
        self.push(
            origin,
            flatten_toml(name, table)?,
            Some(path_str.clone()),
            Some(digest.clone()),
        );

        if let Some(variant_layer) = build_type_layer(name, build_types, build_type)? {
            self.push(origin, variant_layer, Some(path_str), Some(digest));
        }

        Ok(true)
    }

    /// Environment overrides taken from `vars`.
    pub fn push_env<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let layer = env_layer(prefix, vars);
        if !layer.is_empty() {
            self.push(ConfigOrigin::Env, layer, None, None);
        }
    }

    /// CLI `KEY=VALUE` overrides.
    pub fn push_cli_overrides(&mut self, overrides: &[String]) -> Result<(), ConfigError> {
        let layer = cli_layer(overrides)?;
        if !layer.is_empty() {
            self.push(ConfigOrigin::Cli, layer, None, None);
        }
        Ok(())
    }

    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn into_parts(self) -> (Vec<ConfigLayer>, Vec<ConfigSource>) {
        (self.layers, self.sources)
    }
}

/// Load and parse a TOML file, returning the table and digest
pub fn load_toml_file(path: &Path) -> Result<(toml::Table, String), ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

    let table: toml::Table = toml::from_str(&contents).map_err(|e| {
        ConfigError::ParseError(format!("TOML parse error in {}: {}", path.display(), e))
    })?;

    Ok((table, digest))
}

fn build_type_layer(
    file_layer: &str,
    build_types: Option<toml::Value>,
    build_type: Option<BuildType>,
) -> Result<Option<ConfigLayer>, ConfigError> {
    let Some(value) = build_types else {
        return Ok(None);
    };

    let toml::Value::Table(mut variants) = value else {
        return Err(ConfigError::UnsupportedValue {
            key: BUILD_TYPES_TABLE.to_string(),
            kind: "non-table",
        });
    };

    let Some(build_type) = build_type else {
        return Ok(None);
    };

    match variants.remove(build_type.as_str()) {
        Some(toml::Value::Table(table)) => {
            let name = format!("{}.{}.{}", file_layer, BUILD_TYPES_TABLE, build_type);
            flatten_toml(&name, table).map(Some)
        }
        Some(_) => Err(ConfigError::UnsupportedValue {
            key: format!("{}.{}", BUILD_TYPES_TABLE, build_type),
            kind: "non-table",
        }),
        None => Ok(None),
    }
}

/// Build the environment layer.
///
/// `BUILDCFG_KOTLIN__JVM_TARGET=17` becomes `kotlin.jvm_target = "17"`.
pub fn env_layer<I>(prefix: &str, vars: I) -> ConfigLayer
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut layer = ConfigLayer::new(ConfigOrigin::Env.as_str());
    for (name, value) in vars {
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let key = rest.to_lowercase().replace("__", ".");
        layer.set(key, parse_scalar(&value));
    }
    layer
}

/// Process environment as UTF-8 pairs.
///
/// Entries whose name or value is not valid Unicode are skipped.
pub fn process_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(name, value)| {
        match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (Ok(name), Err(_)) => {
                tracing::debug!(name = %name, "skipping non-UTF-8 environment value");
                None
            }
            _ => None,
        }
    })
}

/// Build the CLI override layer; later overrides of the same key win.
pub fn cli_layer(overrides: &[String]) -> Result<ConfigLayer, ConfigError> {
    let mut layer = ConfigLayer::new(ConfigOrigin::Cli.as_str());
    for raw in overrides {
        let (key, value) = parse_override(raw)?;
        layer.set(key, value);
    }
    Ok(layer)
}
