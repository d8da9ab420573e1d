//! Built-in application defaults (layer 1) and build-type overlays (layer 2)
//!
//! The defaults mirror the Android application module of the Flutter
//! project; build-type overlays carry the per-variant settings.

use buildcfg_resolver::{ConfigLayer, ConfigResolver, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Well-known configuration keys
pub mod keys {
    pub const NAMESPACE: &str = "namespace";
    pub const APPLICATION_ID: &str = "application_id";
    pub const COMPILE_SDK: &str = "compile_sdk";
    pub const MIN_SDK: &str = "min_sdk";
    pub const TARGET_SDK: &str = "target_sdk";
    pub const VERSION_CODE: &str = "version_code";
    pub const VERSION_NAME: &str = "version_name";
    pub const JAVA_SOURCE_COMPATIBILITY: &str = "java.source_compatibility";
    pub const JAVA_TARGET_COMPATIBILITY: &str = "java.target_compatibility";
    pub const KOTLIN_JVM_TARGET: &str = "kotlin.jvm_target";
    pub const FLUTTER_SOURCE: &str = "flutter.source";
    pub const BUILD_TYPE: &str = "build_type";
    pub const DEBUGGABLE: &str = "debuggable";
    pub const MINIFY_ENABLED: &str = "minify_enabled";
    pub const SIGNING_CONFIG: &str = "signing_config";
}

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Kotlin/R class namespace (default: "com.gchegg.hvhevev")
    pub namespace: String,

    /// Package name on device (default: "com.gchegg.hvhevev")
    pub application_id: String,

    /// SDK level compiled against (default: 36)
    pub compile_sdk: u32,

    /// Lowest supported SDK level (default: 25)
    pub min_sdk: u32,

    /// SDK level the app is tested against (default: 36)
    pub target_sdk: u32,

    /// Monotonic version number (default: 1)
    pub version_code: u32,

    /// User-visible version (default: "1.0.0")
    pub version_name: String,

    /// Java language level for source, target and Kotlin JVM target (default: "17")
    pub java_version: String,

    /// Flutter project root relative to the module (default: "../..")
    pub flutter_source: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            namespace: "com.gchegg.hvhevev".to_string(),
            application_id: "com.gchegg.hvhevev".to_string(),
            compile_sdk: 36,
            min_sdk: 25,
            target_sdk: 36,
            version_code: 1,
            version_name: "1.0.0".to_string(),
            java_version: "17".to_string(),
            flutter_source: "../..".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a configuration layer named "builtin"
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer::new("builtin")
            .with(keys::NAMESPACE, self.namespace.as_str())
            .with(keys::APPLICATION_ID, self.application_id.as_str())
            .with(keys::COMPILE_SDK, self.compile_sdk)
            .with(keys::MIN_SDK, self.min_sdk)
            .with(keys::TARGET_SDK, self.target_sdk)
            .with(keys::VERSION_CODE, self.version_code)
            .with(keys::VERSION_NAME, self.version_name.as_str())
            .with(keys::JAVA_SOURCE_COMPATIBILITY, self.java_version.as_str())
            .with(keys::JAVA_TARGET_COMPATIBILITY, self.java_version.as_str())
            .with(keys::KOTLIN_JVM_TARGET, self.java_version.as_str())
            .with(keys::FLUTTER_SOURCE, self.flutter_source.as_str())
    }
}

/// Build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }

    /// Per-variant settings.
    ///
    /// Release is signed with the debug signing config until a release
    /// keystore is supplied by a higher layer.
    pub fn overlay(&self) -> ConfigLayer {
        let layer = ConfigLayer::new(format!("build_type.{}", self.as_str()))
            .with(keys::BUILD_TYPE, self.as_str())
            .with(keys::MINIFY_ENABLED, false)
            .with(keys::SIGNING_CONFIG, "debug");

        match self {
            BuildType::Debug => layer.with(keys::DEBUGGABLE, true),
            BuildType::Release => layer.with(keys::DEBUGGABLE, false),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            other => Err(format!(
                "Invalid build type '{}'. Valid: debug, release",
                other
            )),
        }
    }
}

/// Keys every build needs
pub const REQUIRED_KEYS: &[&str] = &[
    keys::APPLICATION_ID,
    keys::NAMESPACE,
    keys::COMPILE_SDK,
    keys::MIN_SDK,
    keys::TARGET_SDK,
    keys::VERSION_CODE,
    keys::VERSION_NAME,
];

/// Expected value types of the well-known keys
pub const EXPECTED_TYPES: &[(&str, ValueKind)] = &[
    (keys::NAMESPACE, ValueKind::String),
    (keys::APPLICATION_ID, ValueKind::String),
    (keys::COMPILE_SDK, ValueKind::Integer),
    (keys::MIN_SDK, ValueKind::Integer),
    (keys::TARGET_SDK, ValueKind::Integer),
    (keys::VERSION_CODE, ValueKind::Integer),
    (keys::VERSION_NAME, ValueKind::String),
    (keys::JAVA_SOURCE_COMPATIBILITY, ValueKind::String),
    (keys::JAVA_TARGET_COMPATIBILITY, ValueKind::String),
    (keys::KOTLIN_JVM_TARGET, ValueKind::String),
    (keys::FLUTTER_SOURCE, ValueKind::String),
    (keys::BUILD_TYPE, ValueKind::String),
    (keys::DEBUGGABLE, ValueKind::Boolean),
    (keys::MINIFY_ENABLED, ValueKind::Boolean),
    (keys::SIGNING_CONFIG, ValueKind::String),
];

/// Resolver with the required keys and expected types of an application build
pub fn application_resolver() -> ConfigResolver {
    EXPECTED_TYPES
        .iter()
        .fold(
            ConfigResolver::new().require_all(REQUIRED_KEYS.iter().copied()),
            |resolver, (key, kind)| resolver.expect_type(*key, *kind),
        )
}
