//! Layered configuration resolution with source tracking.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Runtime overrides from environment variables
//! 2. The preset selected by the active environment name
//! 3. Compiled-in defaults
//!
//! Every layer is stripped of unset values and then deep-merged over the
//! layers below it, so a field only changes when a higher layer actually
//! sets it.

use std::collections::BTreeMap;

use serde_json::Value;

use super::env::{self, binding_for};
use super::error::Result;
use super::merge::{deep_merge, leaf_paths, strip_unset};
use super::partial::PartialAppConfig;
use super::presets::PresetRegistry;
use super::schema::AppConfig;
use super::validate::check_shape;

/// Tracks which layer supplied a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Compiled-in default
    Default,
    /// Named environment preset
    Preset(String),
    /// Environment variable override
    EnvVar(String),
    /// Override not tied to a known variable
    Override,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::Preset(name) => write!(f, "preset:{}", name),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Override => write!(f, "override"),
        }
    }
}

/// Immutable resolved configuration with per-leaf source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    config: AppConfig,
    environment: String,
    preset_applied: bool,
    sources: BTreeMap<String, ValueSource>,
}

impl ResolvedConfig {
    /// Resolve from the real process environment, using the built-in presets.
    ///
    /// Fails when a recognised variable is set to a value that is not UTF-8.
    pub fn from_process_env() -> Result<Self> {
        env::check_unicode(|var: &str| std::env::var_os(var))?;
        Self::from_lookup(env::process_env)
    }

    /// Resolve from an environment lookup, using the built-in presets.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = env::environment_name(&lookup);
        let overrides = env::overrides_from(&lookup)?;
        resolve(
            &AppConfig::default(),
            &environment,
            &PresetRegistry::builtin(),
            &overrides,
        )
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Name of the environment the config was resolved for
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Whether a preset matched the environment name
    pub fn preset_applied(&self) -> bool {
        self.preset_applied
    }

    /// Layer that supplied the value at a dotted leaf path
    pub fn source_of(&self, path: &str) -> Option<&ValueSource> {
        self.sources.get(path)
    }

    /// Every leaf path with its source, in path order
    pub fn sources(&self) -> impl Iterator<Item = (&str, &ValueSource)> {
        self.sources.iter().map(|(path, source)| (path.as_str(), source))
    }
}

/// Resolve `defaults ⊕ preset(environment) ⊕ overrides`.
///
/// An environment with no registered preset resolves with no preset layer.
/// Pure: no I/O, no clock.
pub fn resolve(
    defaults: &AppConfig,
    environment: &str,
    presets: &PresetRegistry,
    overrides: &PartialAppConfig,
) -> Result<ResolvedConfig> {
    let schema = serde_json::to_value(defaults)?;
    let mut merged = schema.clone();
    let mut sources: BTreeMap<String, ValueSource> = leaf_paths(&schema)
        .into_iter()
        .map(|path| (path, ValueSource::Default))
        .collect();

    let preset = presets.get(environment);
    match preset {
        Some(preset) => {
            let layer = apply_layer(&schema, &mut merged, preset)?;
            for path in layer {
                sources.insert(path, ValueSource::Preset(environment.to_string()));
            }
        }
        None => tracing::debug!("No config preset for environment {}", environment),
    }

    for path in apply_layer(&schema, &mut merged, overrides)? {
        let source = match binding_for(&path) {
            Some(binding) => ValueSource::EnvVar(binding.var.to_string()),
            None => ValueSource::Override,
        };
        sources.insert(path, source);
    }

    let config: AppConfig = serde_json::from_value(merged)?;
    Ok(ResolvedConfig {
        config,
        environment: environment.to_string(),
        preset_applied: preset.is_some(),
        sources,
    })
}

/// Strip, validate and merge one layer. Returns the leaf paths it set.
fn apply_layer(schema: &Value, merged: &mut Value, layer: &PartialAppConfig) -> Result<Vec<String>> {
    let Some(layer) = strip_unset(serde_json::to_value(layer)?) else {
        return Ok(Vec::new());
    };
    check_shape(schema, &layer)?;
    deep_merge(merged, &layer);
    Ok(leaf_paths(&layer))
}
