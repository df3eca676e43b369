//! Inkpad - resolve the deployment configuration and load user settings

use std::rc::Rc;

use anyhow::{Context, Result};
use inkpad::config::ResolvedConfig;
use inkpad::settings::{ManualColorScheme, SettingsStore};
use inkpad::storage::{FileStore, MemoryStore};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let resolved = ResolvedConfig::from_process_env().context("Failed to resolve configuration")?;
    let config = resolved.config();

    // Initialize logging
    let console = config
        .logging
        .console
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(console)
        .with(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!(
        "Starting {} {} ({} environment)",
        config.app.name,
        config.app.version,
        resolved.environment()
    );
    if !resolved.preset_applied() {
        tracing::info!("No preset named {}, using defaults", resolved.environment());
    }
    for (path, source) in resolved.sources() {
        tracing::debug!("{} <- {}", path, source);
    }

    let color_scheme = Rc::new(ManualColorScheme::default());
    let store = match FileStore::open_default() {
        Ok(files) => {
            tracing::info!("Settings directory: {}", files.dir().display());
            SettingsStore::load(files, color_scheme)
        }
        Err(e) => {
            tracing::warn!("{}, keeping settings in memory", e);
            SettingsStore::load(MemoryStore::new(), color_scheme)
        }
    };
    let store = Rc::new(store);
    let _watch = store.watch_color_scheme();
    tracing::debug!("Effective theme: {}", store.effective_theme());

    let json = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", json);

    Ok(())
}
