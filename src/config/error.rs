//! Configuration errors

use buildcfg_resolver::ResolveError;

/// Errors raised while loading, resolving or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported value for '{key}': {kind} values are not allowed")]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("Invalid override '{0}': expected KEY=VALUE")]
    InvalidOverride(String),

    #[error("Invalid type expectation '{0}': expected KEY=string|integer|boolean")]
    InvalidExpectation(String),

    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
