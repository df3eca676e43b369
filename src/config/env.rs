//! Environment variable overrides
//!
//! Each recognised variable feeds exactly one configuration leaf. Values are
//! parsed according to the type the default schema holds at that leaf. A
//! variable that is missing or blank leaves its field unset.

use std::env::VarError;
use std::ffi::OsString;

use serde_json::{Map, Value};

use super::error::{ConfigError, Result};
use super::merge::{deep_merge, get_path, set_path};
use super::partial::PartialAppConfig;
use super::schema::AppConfig;

/// Variable selecting the active environment preset.
pub const ENVIRONMENT_VAR: &str = "INKPAD_ENV";

/// Environment used when `INKPAD_ENV` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Maps one environment variable onto one configuration leaf.
#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
    pub var: &'static str,
    pub path: &'static str,
}

pub const ENV_BINDINGS: &[EnvBinding] = &[
    EnvBinding { var: "INKPAD_API_URL", path: "api.baseUrl" },
    EnvBinding { var: "INKPAD_API_TIMEOUT", path: "api.timeout" },
    EnvBinding { var: "INKPAD_COLLAB_ENABLED", path: "collaboration.enabled" },
    EnvBinding { var: "INKPAD_COLLAB_URL", path: "collaboration.serverUrl" },
    EnvBinding { var: "INKPAD_COLLAB_RECONNECT_INTERVAL", path: "collaboration.reconnectInterval" },
    EnvBinding { var: "INKPAD_GITHUB_CLIENT_ID", path: "github.clientId" },
    EnvBinding { var: "INKPAD_GITHUB_API_URL", path: "github.apiUrl" },
    EnvBinding { var: "INKPAD_GITHUB_SCOPES", path: "github.scopes" },
    EnvBinding { var: "INKPAD_FEATURE_TELEMETRY", path: "features.telemetry" },
    EnvBinding { var: "INKPAD_FEATURE_EXPERIMENTAL", path: "features.experimental" },
    EnvBinding { var: "INKPAD_LOG_LEVEL", path: "logging.level" },
    EnvBinding { var: "INKPAD_LOG_FILE", path: "logging.file" },
    EnvBinding { var: "INKPAD_ALLOWED_ORIGINS", path: "security.allowedOrigins" },
];

/// Read a variable from the real process environment.
///
/// A value that is not UTF-8 reads as unset; [`check_unicode`] rejects those
/// for recognised variables before resolution.
pub fn process_env(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            tracing::warn!("Ignoring {}: value is not valid UTF-8", var);
            None
        }
    }
}

/// Reject recognised variables whose raw value is not UTF-8.
pub fn check_unicode<F>(var_os: F) -> Result<()>
where
    F: Fn(&str) -> Option<OsString>,
{
    let environment = EnvBinding { var: ENVIRONMENT_VAR, path: "app.environment" };
    for binding in std::iter::once(&environment).chain(ENV_BINDINGS) {
        let Some(raw) = var_os(binding.var) else {
            continue;
        };
        if raw.to_str().is_none() {
            return Err(ConfigError::InvalidEnvValue {
                var: binding.var,
                path: binding.path,
                value: raw.to_string_lossy().into_owned(),
                reason: "value is not valid UTF-8".to_string(),
            });
        }
    }
    Ok(())
}

/// Binding that feeds a configuration path, if any.
pub fn binding_for(path: &str) -> Option<&'static EnvBinding> {
    ENV_BINDINGS.iter().find(|binding| binding.path == path)
}

/// Active environment name.
pub fn environment_name<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENVIRONMENT_VAR)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Build the runtime override layer from an environment lookup.
pub fn overrides_from<F>(lookup: F) -> Result<PartialAppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let schema = serde_json::to_value(AppConfig::default())?;
    let mut tree = Value::Object(Map::new());

    for binding in ENV_BINDINGS {
        let Some(raw) = lookup(binding.var) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let expected = get_path(&schema, binding.path).ok_or_else(|| ConfigError::UnknownField {
            path: binding.path.to_string(),
        })?;
        let invalid = |reason: String| ConfigError::InvalidEnvValue {
            var: binding.var,
            path: binding.path,
            value: raw.to_string(),
            reason,
        };

        let value = parse_value(expected, raw).map_err(invalid)?;
        let mut single = Value::Object(Map::new());
        set_path(&mut single, binding.path, value);
        // Enumerations only fail once the typed layer sees them.
        serde_json::from_value::<PartialAppConfig>(single.clone())
            .map_err(|e| invalid(e.to_string()))?;

        tracing::debug!("Config override {} from {}", binding.path, binding.var);
        deep_merge(&mut tree, &single);
    }

    Ok(serde_json::from_value(tree)?)
}

fn parse_value(expected: &Value, raw: &str) -> std::result::Result<Value, String> {
    match expected {
        Value::Bool(_) => parse_bool(raw).map(Value::Bool),
        Value::Number(n) if n.is_u64() => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|e| e.to_string()),
        Value::Number(n) if n.is_i64() => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| e.to_string()),
        Value::Number(_) => {
            let parsed = raw.parse::<f64>().map_err(|e| e.to_string())?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| "not a finite number".to_string())
        }
        Value::String(_) => Ok(Value::String(raw.to_string())),
        Value::Array(_) => Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        )),
        _ => Err("field cannot be set from the environment".to_string()),
    }
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no or on/off".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_every_binding_points_at_a_schema_leaf() {
        let schema = serde_json::to_value(AppConfig::default()).unwrap();
        for binding in ENV_BINDINGS {
            let leaf = get_path(&schema, binding.path);
            assert!(
                leaf.is_some_and(|value| !value.is_object()),
                "{} -> {}",
                binding.var,
                binding.path
            );
        }
    }

    #[test]
    fn test_no_vars_is_empty_override() {
        let overrides = overrides_from(lookup(&[])).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_parses_by_schema_type() {
        let overrides = overrides_from(lookup(&[
            ("INKPAD_COLLAB_RECONNECT_INTERVAL", "5000"),
            ("INKPAD_COLLAB_ENABLED", "No"),
            ("INKPAD_GITHUB_SCOPES", "repo, read:org ,,"),
            ("INKPAD_LOG_LEVEL", "warn"),
        ]))
        .unwrap();

        let collab = overrides.collaboration.unwrap();
        assert_eq!(collab.reconnect_interval, Some(5000));
        assert_eq!(collab.enabled, Some(false));
        assert_eq!(collab.server_url, None);
        assert_eq!(
            overrides.github.unwrap().scopes,
            Some(vec!["repo".to_string(), "read:org".to_string()])
        );
        assert_eq!(overrides.logging.unwrap().level, Some(LogLevel::Warn));
        assert!(overrides.api.is_none());
    }

    #[test]
    fn test_blank_value_is_unset() {
        let overrides = overrides_from(lookup(&[("INKPAD_API_TIMEOUT", "  ")])).unwrap();
        assert!(overrides.api.is_none());
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = overrides_from(lookup(&[("INKPAD_API_TIMEOUT", "soon")])).unwrap_err();
        match err {
            ConfigError::InvalidEnvValue { var, path, value, .. } => {
                assert_eq!(var, "INKPAD_API_TIMEOUT");
                assert_eq!(path, "api.timeout");
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid env value, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let var_os = |var: &str| match var {
            "INKPAD_API_URL" => Some(OsString::from_vec(vec![b'h', 0xff, b'p'])),
            "INKPAD_LOG_LEVEL" => Some(OsString::from("debug")),
            _ => None,
        };
        match check_unicode(var_os) {
            Err(ConfigError::InvalidEnvValue { var, path, .. }) => {
                assert_eq!(var, "INKPAD_API_URL");
                assert_eq!(path, "api.baseUrl");
            }
            other => panic!("expected invalid env value, got {:?}", other),
        }
    }

    #[test]
    fn test_unicode_values_pass() {
        let var_os = |var: &str| (var == "INKPAD_ENV").then(|| OsString::from("production"));
        assert!(check_unicode(var_os).is_ok());
    }

    #[test]
    fn test_invalid_enum_names_variable() {
        let err = overrides_from(lookup(&[("INKPAD_LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvValue { var: "INKPAD_LOG_LEVEL", .. }
        ));
    }

    #[test]
    fn test_environment_name_default() {
        assert_eq!(environment_name(lookup(&[])), "development");
        assert_eq!(environment_name(lookup(&[("INKPAD_ENV", "")])), "development");
        assert_eq!(
            environment_name(lookup(&[("INKPAD_ENV", " production ")])),
            "production"
        );
    }

    #[test]
    fn test_binding_for() {
        assert_eq!(binding_for("api.baseUrl").map(|b| b.var), Some("INKPAD_API_URL"));
        assert!(binding_for("api.retryDelay").is_none());
    }
}
