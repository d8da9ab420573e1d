//! Layered build configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in application defaults
//! 2. Build-type overlay (debug/release)
//! 3. Host config (~/.config/buildcfg/config.toml)
//! 4. Project config (buildcfg.toml), plus its `[build_types.<name>]` table
//! 5. Environment (BUILDCFG_*)
//! 6. CLI `--set` overrides

mod defaults;
mod effective;
mod error;
mod flatten;
mod sources;

pub use defaults::{
    application_resolver, keys, BuildType, BuiltinDefaults, EXPECTED_TYPES, REQUIRED_KEYS,
};
pub use effective::{EffectiveConfig, MAX_VERSION_CODE, REDACTED, SCHEMA_ID, SCHEMA_VERSION};
pub use error::ConfigError;
pub use flatten::{flatten_json, flatten_toml, parse_expectation, parse_override, parse_scalar};
pub use sources::{
    cli_layer, env_layer, load_toml_file, process_env, ConfigOrigin, ConfigSource, LayerStack,
    BUILD_TYPES_TABLE, ENV_PREFIX,
};
