//! Canonical application configuration schema
//!
//! The `Default` impls in this module are the compiled-in defaults and the
//! source of truth for the shape every other layer is checked against.

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Fully resolved application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub api: ApiConfig,
    pub collaboration: CollaborationConfig,
    pub github: GithubConfig,
    pub storage: StorageConfig,
    pub features: FeaturesConfig,
    pub app: AppInfoConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub performance: PerformanceConfig,
}

/// Backend API endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL for REST calls
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout: u64,
    /// Number of retries for idempotent requests
    pub retry_attempts: u32,
    /// Delay between retries in milliseconds
    pub retry_delay: u64,
}

/// Real-time collaboration endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationConfig {
    pub enabled: bool,
    /// WebSocket server URL
    pub server_url: String,
    /// Milliseconds between reconnect attempts
    pub reconnect_interval: u64,
    pub max_reconnect_attempts: u32,
    /// Milliseconds between heartbeats
    pub heartbeat_interval: u64,
}

/// GitHub OAuth application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubConfig {
    pub client_id: String,
    pub api_url: String,
    pub redirect_uri: String,
    /// OAuth scopes requested at sign-in
    pub scopes: Vec<String>,
}

/// Local document storage limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Prefix applied to durable store keys
    pub key_prefix: String,
    /// Largest document accepted, in bytes
    pub max_document_size: u64,
    /// Auto-save interval in milliseconds
    pub auto_save_interval: u64,
    pub max_recent_files: u32,
}

/// Feature flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfig {
    pub collaboration: bool,
    pub github: bool,
    pub spell_check: bool,
    pub telemetry: bool,
    /// Names of experimental features switched on for this deployment
    pub experimental: Vec<String>,
}

/// Application identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoConfig {
    pub name: String,
    pub version: String,
    /// Name of the deployment environment this build runs in
    pub environment: String,
    pub update_check_url: String,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Emit logs to stderr
    pub console: bool,
    /// Emit logs to a rotating file
    pub file: bool,
    /// Rotation threshold in bytes
    pub max_file_size: u64,
    pub max_files: u32,
}

/// Content security settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    pub enable_csp: bool,
    pub allowed_origins: Vec<String>,
    /// Session timeout in milliseconds
    pub session_timeout: u64,
}

/// Editor performance tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    /// Virtualize long documents
    pub virtualization: bool,
    /// Input debounce in milliseconds
    pub debounce_delay: u64,
    pub max_undo_steps: u32,
    /// Number of blocks rendered eagerly before lazy loading kicks in
    pub lazy_load_threshold: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: 30_000,
            retry_attempts: 3,
            retry_delay: 1_000,
        }
    }
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: "ws://localhost:1234".to_string(),
            reconnect_interval: 3_000,
            max_reconnect_attempts: 10,
            heartbeat_interval: 30_000,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_url: "https://api.github.com".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            scopes: vec!["repo".to_string(), "user".to_string()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: "inkpad".to_string(),
            max_document_size: 10 * 1024 * 1024,
            auto_save_interval: 30_000,
            max_recent_files: 10,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            collaboration: true,
            github: true,
            spell_check: true,
            telemetry: false,
            experimental: Vec::new(),
        }
    }
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            name: "Inkpad".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            update_check_url: "https://inkpad.app/releases/latest.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            file: false,
            max_file_size: 5 * 1024 * 1024,
            max_files: 5,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_csp: true,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            session_timeout: 3_600_000,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            virtualization: true,
            debounce_delay: 300,
            max_undo_steps: 100,
            lazy_load_threshold: 50,
        }
    }
}
