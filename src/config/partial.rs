//! Override representation of the configuration schema
//!
//! Every field at every level is optional. `None` means "not configured" and
//! is never serialized, so a partial layer can only ever contribute the values
//! it actually sets.

use serde::{Deserialize, Serialize};

use super::schema::{
    ApiConfig, AppConfig, AppInfoConfig, CollaborationConfig, FeaturesConfig, GithubConfig,
    LogLevel, LoggingConfig, PerformanceConfig, SecurityConfig, StorageConfig,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<PartialApiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<PartialCollaborationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<PartialGithubConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<PartialStorageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<PartialFeaturesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<PartialAppInfoConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<PartialLoggingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<PartialSecurityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PartialPerformanceConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialCollaborationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialGithubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_document_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recent_files: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialFeaturesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAppInfoConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_check_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialSecurityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_csp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialPerformanceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtualization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_undo_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lazy_load_threshold: Option<u32>,
}

impl PartialAppConfig {
    /// Create an override that sets nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when serializing this layer yields no leaves at all.
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(super::merge::strip_unset)
            .is_none()
    }
}

/// Lift a fully resolved config into an override that sets every field.
impl From<&AppConfig> for PartialAppConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api: Some((&config.api).into()),
            collaboration: Some((&config.collaboration).into()),
            github: Some((&config.github).into()),
            storage: Some((&config.storage).into()),
            features: Some((&config.features).into()),
            app: Some((&config.app).into()),
            logging: Some((&config.logging).into()),
            security: Some((&config.security).into()),
            performance: Some((&config.performance).into()),
        }
    }
}

impl From<&ApiConfig> for PartialApiConfig {
    fn from(c: &ApiConfig) -> Self {
        Self {
            base_url: Some(c.base_url.clone()),
            timeout: Some(c.timeout),
            retry_attempts: Some(c.retry_attempts),
            retry_delay: Some(c.retry_delay),
        }
    }
}

impl From<&CollaborationConfig> for PartialCollaborationConfig {
    fn from(c: &CollaborationConfig) -> Self {
        Self {
            enabled: Some(c.enabled),
            server_url: Some(c.server_url.clone()),
            reconnect_interval: Some(c.reconnect_interval),
            max_reconnect_attempts: Some(c.max_reconnect_attempts),
            heartbeat_interval: Some(c.heartbeat_interval),
        }
    }
}

impl From<&GithubConfig> for PartialGithubConfig {
    fn from(c: &GithubConfig) -> Self {
        Self {
            client_id: Some(c.client_id.clone()),
            api_url: Some(c.api_url.clone()),
            redirect_uri: Some(c.redirect_uri.clone()),
            scopes: Some(c.scopes.clone()),
        }
    }
}

impl From<&StorageConfig> for PartialStorageConfig {
    fn from(c: &StorageConfig) -> Self {
        Self {
            key_prefix: Some(c.key_prefix.clone()),
            max_document_size: Some(c.max_document_size),
            auto_save_interval: Some(c.auto_save_interval),
            max_recent_files: Some(c.max_recent_files),
        }
    }
}

impl From<&FeaturesConfig> for PartialFeaturesConfig {
    fn from(c: &FeaturesConfig) -> Self {
        Self {
            collaboration: Some(c.collaboration),
            github: Some(c.github),
            spell_check: Some(c.spell_check),
            telemetry: Some(c.telemetry),
            experimental: Some(c.experimental.clone()),
        }
    }
}

impl From<&AppInfoConfig> for PartialAppInfoConfig {
    fn from(c: &AppInfoConfig) -> Self {
        Self {
            name: Some(c.name.clone()),
            version: Some(c.version.clone()),
            environment: Some(c.environment.clone()),
            update_check_url: Some(c.update_check_url.clone()),
        }
    }
}

impl From<&LoggingConfig> for PartialLoggingConfig {
    fn from(c: &LoggingConfig) -> Self {
        Self {
            level: Some(c.level),
            console: Some(c.console),
            file: Some(c.file),
            max_file_size: Some(c.max_file_size),
            max_files: Some(c.max_files),
        }
    }
}

impl From<&SecurityConfig> for PartialSecurityConfig {
    fn from(c: &SecurityConfig) -> Self {
        Self {
            enable_csp: Some(c.enable_csp),
            allowed_origins: Some(c.allowed_origins.clone()),
            session_timeout: Some(c.session_timeout),
        }
    }
}

impl From<&PerformanceConfig> for PartialPerformanceConfig {
    fn from(c: &PerformanceConfig) -> Self {
        Self {
            virtualization: Some(c.virtualization),
            debounce_delay: Some(c.debounce_delay),
            max_undo_steps: Some(c.max_undo_steps),
            lazy_load_threshold: Some(c.lazy_load_threshold),
        }
    }
}
