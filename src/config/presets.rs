//! Environment-specific configuration presets

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::{ConfigError, Result};
use super::partial::{
    PartialApiConfig, PartialAppConfig, PartialAppInfoConfig, PartialCollaborationConfig,
    PartialFeaturesConfig, PartialLoggingConfig, PartialPerformanceConfig, PartialSecurityConfig,
};
use super::schema::{AppConfig, LogLevel};
use super::validate::{check_shape, check_typed};

/// Named presets, looked up by the active environment name
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, PartialAppConfig>,
}

impl PresetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `development`, `production` and `test` presets
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("development", development());
        registry.register("production", production());
        registry.register("test", testing());
        registry
    }

    /// Add or replace a preset
    pub fn register(&mut self, name: impl Into<String>, preset: PartialAppConfig) {
        self.presets.insert(name.into(), preset);
    }

    /// Add or replace a preset from a JSON document.
    ///
    /// The document is checked against the default schema first so a typo or
    /// a wrongly typed value is reported with its path.
    pub fn register_json(&mut self, name: impl Into<String>, json: &str) -> Result<()> {
        let name = name.into();
        let value: Value = serde_json::from_str(json).map_err(|source| ConfigError::PresetParse {
            name: name.clone(),
            source,
        })?;

        let schema = serde_json::to_value(AppConfig::default())?;
        check_shape(&schema, &value)?;
        check_typed::<PartialAppConfig>(&value)?;

        let preset: PartialAppConfig = serde_json::from_value(value)?;
        tracing::debug!("Registered preset {}", name);
        self.register(name, preset);
        Ok(())
    }

    /// Preset for an environment name, if any
    pub fn get(&self, name: &str) -> Option<&PartialAppConfig> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

fn development() -> PartialAppConfig {
    PartialAppConfig {
        features: Some(PartialFeaturesConfig {
            experimental: Some(vec!["outline-view".to_string()]),
            ..Default::default()
        }),
        app: Some(PartialAppInfoConfig {
            environment: Some("development".to_string()),
            ..Default::default()
        }),
        logging: Some(PartialLoggingConfig {
            level: Some(LogLevel::Debug),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn production() -> PartialAppConfig {
    PartialAppConfig {
        api: Some(PartialApiConfig {
            base_url: Some("/api".to_string()),
            ..Default::default()
        }),
        collaboration: Some(PartialCollaborationConfig {
            server_url: Some("wss://collab.inkpad.app".to_string()),
            ..Default::default()
        }),
        features: Some(PartialFeaturesConfig {
            telemetry: Some(true),
            ..Default::default()
        }),
        app: Some(PartialAppInfoConfig {
            environment: Some("production".to_string()),
            ..Default::default()
        }),
        logging: Some(PartialLoggingConfig {
            level: Some(LogLevel::Warn),
            file: Some(true),
            ..Default::default()
        }),
        security: Some(PartialSecurityConfig {
            allowed_origins: Some(vec!["https://inkpad.app".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn testing() -> PartialAppConfig {
    PartialAppConfig {
        api: Some(PartialApiConfig {
            timeout: Some(5_000),
            ..Default::default()
        }),
        collaboration: Some(PartialCollaborationConfig {
            enabled: Some(false),
            ..Default::default()
        }),
        features: Some(PartialFeaturesConfig {
            collaboration: Some(false),
            github: Some(false),
            ..Default::default()
        }),
        app: Some(PartialAppInfoConfig {
            environment: Some("test".to_string()),
            ..Default::default()
        }),
        logging: Some(PartialLoggingConfig {
            level: Some(LogLevel::Error),
            console: Some(false),
            ..Default::default()
        }),
        performance: Some(PartialPerformanceConfig {
            debounce_delay: Some(0),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = PresetRegistry::builtin();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["development", "production", "test"]);
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(PresetRegistry::builtin().get("staging").is_none());
    }

    #[test]
    fn test_register_json() {
        let mut registry = PresetRegistry::new();
        registry
            .register_json(
                "staging",
                r#"{"api":{"baseUrl":"https://staging.inkpad.app/api","timeout":null},"logging":{"level":"debug"}}"#,
            )
            .unwrap();
        let staging = registry.get("staging").unwrap();
        let api = staging.api.as_ref().unwrap();
        assert_eq!(api.base_url.as_deref(), Some("https://staging.inkpad.app/api"));
        assert_eq!(api.timeout, None);
        assert_eq!(staging.logging.as_ref().unwrap().level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_register_json_reports_path() {
        let mut registry = PresetRegistry::new();
        let err = registry
            .register_json("broken", r#"{"collaboration":{"reconnectInterval":"soon"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("collaboration.reconnectInterval"));
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn test_register_json_reports_path_of_typed_failures() {
        let cases = [
            (r#"{"features":{"experimental":[1]}}"#, "features.experimental[0]"),
            (r#"{"logging":{"level":"loud"}}"#, "logging.level"),
            (r#"{"api":{"retryAttempts":5000000000}}"#, "api.retryAttempts"),
        ];
        for (json, expected) in cases {
            let mut registry = PresetRegistry::new();
            match registry.register_json("broken", json) {
                Err(ConfigError::InvalidValue { path, .. }) => assert_eq!(path, expected),
                other => panic!("expected invalid value at {}, got {:?}", expected, other),
            }
            assert!(registry.get("broken").is_none());
        }
    }

    #[test]
    fn test_register_json_rejects_bad_syntax() {
        let mut registry = PresetRegistry::new();
        let err = registry.register_json("broken", "{not json").unwrap_err();
        assert!(matches!(err, ConfigError::PresetParse { .. }));
    }
}
