//! Configuration resolution errors
//!
//! Every variant is fatal at startup: a misconfigured deployment must not run
//! with values it did not ask for.

/// Error raised while resolving the application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration field `{path}` expects {expected}, found {found}")]
    SchemaMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("configuration field `{path}` has an invalid value: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("configuration field `{path}` is not part of the schema")]
    UnknownField { path: String },

    #[error("environment variable {var} (for `{path}`) has invalid value {value:?}: {reason}")]
    InvalidEnvValue {
        var: &'static str,
        path: &'static str,
        value: String,
        reason: String,
    },

    #[error("preset `{name}` is not valid JSON: {source}")]
    PresetParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration does not fit the schema: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Result type alias for configuration resolution.
pub type Result<T> = std::result::Result<T, ConfigError>;
