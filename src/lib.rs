//! Inkpad - configuration and settings core of the Inkpad document editor
//!
//! Two independent pieces of state live here:
//!
//! - [`config`] resolves the read-only deployment configuration once at startup
//! - [`settings`] owns the user-editable settings, persisted through [`storage`]

pub mod config;
pub mod settings;
pub mod storage;
