//! Deployment configuration.
//!
//! The configuration is resolved once at startup from three layers and is
//! read-only afterwards:
//!
//! - `defaults` - the [`AppConfig`] `Default` impls, which also define the schema
//! - `preset` - a [`PartialAppConfig`] chosen by the `INKPAD_ENV` environment name
//! - `overrides` - a [`PartialAppConfig`] built from `INKPAD_*` environment variables
//!
//! Use [`ResolvedConfig::from_process_env`] at startup, or [`resolve`] when
//! the layers come from somewhere else.

pub mod env;
pub mod error;
pub mod merge;
pub mod partial;
pub mod presets;
pub mod resolver;
pub mod schema;
pub mod validate;

pub use error::ConfigError;
pub use partial::PartialAppConfig;
pub use presets::PresetRegistry;
pub use resolver::{resolve, ResolvedConfig, ValueSource};
pub use schema::{AppConfig, LogLevel};
