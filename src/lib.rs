//! buildcfg - layered build configuration for application builds
//!
//! Collects build settings from built-in defaults, build-type overlays,
//! config files, the environment and command-line overrides, and resolves
//! them into one validated configuration for downstream build steps.

pub mod config;

pub use buildcfg_resolver::{
    resolve, resolve_with_types, ConfigLayer, ConfigResolver, ConfigValue, ResolveError,
    ResolvedConfig, ValueKind,
};
pub use config::{BuildType, ConfigError, ConfigOrigin, EffectiveConfig, LayerStack};
