//! Persisted, observable settings store

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use super::listeners::{Listeners, SubscriptionId};
use super::theme::{ColorSchemeSource, ColorSchemeWatch, ResolvedTheme, Theme};
use super::{ApplicationSettings, Category, SettingsCategory};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized settings snapshot
pub const SETTINGS_KEY: &str = "inkpad.settings";

/// Storage key holding the resolved theme string.
///
/// Read by older builds before settings are loaded. Remove once they are gone.
pub const LEGACY_THEME_KEY: &str = "inkpad.theme";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("settings must be a JSON object")]
    NotAnObject,
}

/// Persistence state of the in-memory snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Loaded from storage (or defaults) and not changed since
    Loaded,
    /// Changed and not yet written successfully
    Mutated,
    /// Last change was written
    Persisted,
}

/// Owner of the user's [`ApplicationSettings`].
///
/// Every mutation replaces the snapshot, writes it to storage and notifies
/// observers. Storage failures are logged and never returned; the in-memory
/// snapshot stays authoritative.
pub struct SettingsStore {
    storage: Box<dyn KeyValueStore>,
    color_scheme: Rc<dyn ColorSchemeSource>,
    current: RefCell<Rc<ApplicationSettings>>,
    state: Cell<StoreState>,
    observers: Listeners<ApplicationSettings>,
}

impl SettingsStore {
    /// Load settings from `storage`, falling back to defaults
    pub fn load(
        storage: impl KeyValueStore + 'static,
        color_scheme: Rc<dyn ColorSchemeSource>,
    ) -> Self {
        let settings = read_snapshot(&storage);
        Self {
            storage: Box::new(storage),
            color_scheme,
            current: RefCell::new(Rc::new(settings)),
            state: Cell::new(StoreState::Loaded),
            observers: Listeners::new(),
        }
    }

    /// Current snapshot
    pub fn settings(&self) -> Rc<ApplicationSettings> {
        Rc::clone(&*self.current.borrow())
    }

    pub fn state(&self) -> StoreState {
        self.state.get()
    }

    /// True when the last change has not been written
    pub fn is_dirty(&self) -> bool {
        self.state.get() == StoreState::Mutated
    }

    /// Change one category. Other categories are left untouched.
    ///
    /// ```ignore
    /// store.update(|editor: &mut EditorSettings| editor.font_size = 16);
    /// ```
    pub fn update<C, F>(&self, change: F)
    where
        C: SettingsCategory,
        F: FnOnce(&mut C),
    {
        let mut next = ApplicationSettings::clone(&self.settings());
        change(C::of_mut(&mut next));
        C::of_mut(&mut next).clamp();
        tracing::debug!("Updated {} settings", C::CATEGORY);
        self.commit(next);
    }

    /// Reset one category, or everything when `category` is `None`
    pub fn reset(&self, category: Option<Category>) {
        let next = match category {
            Some(category) => {
                let mut next = ApplicationSettings::clone(&self.settings());
                next.reset_category(category);
                tracing::info!("Reset {} settings", category);
                next
            }
            None => {
                tracing::info!("Reset all settings");
                ApplicationSettings::default()
            }
        };
        self.commit(next);
    }

    /// Theme to apply right now. `system` follows the host preference.
    pub fn effective_theme(&self) -> ResolvedTheme {
        let theme = self.current.borrow().ui.theme;
        theme.resolve(self.color_scheme.prefers_dark())
    }

    /// Call `callback` with the new snapshot after every change
    pub fn subscribe(&self, callback: impl Fn(&ApplicationSettings) + 'static) -> SubscriptionId {
        self.observers.add(Rc::new(callback))
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Follow host colour-scheme changes until the returned guard is dropped
    pub fn watch_color_scheme(self: &Rc<Self>) -> ColorSchemeWatch {
        let store = Rc::downgrade(self);
        let id = self.color_scheme.subscribe(Rc::new(move || {
            if let Some(store) = store.upgrade() {
                store.color_scheme_changed();
            }
        }));
        ColorSchemeWatch::new(Rc::clone(&self.color_scheme), id)
    }

    /// Pretty-printed snapshot
    pub fn export_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(&*self.settings()).map_err(SettingsError::Serialize)
    }

    /// Replace the settings with an exported snapshot.
    ///
    /// The snapshot is merged over the defaults the same way a stored one is
    /// on load.
    pub fn import_json(&self, json: &str) -> Result<(), SettingsError> {
        let value: Value = serde_json::from_str(json).map_err(SettingsError::Parse)?;
        if !value.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        tracing::info!("Importing settings");
        self.commit(ApplicationSettings::from_snapshot(&value));
        Ok(())
    }

    fn color_scheme_changed(&self) {
        if self.current.borrow().ui.theme != Theme::System {
            return;
        }
        self.write_legacy_theme();
        self.observers.emit(&self.settings());
    }

    fn commit(&self, next: ApplicationSettings) {
        *self.current.borrow_mut() = Rc::new(next);
        self.state.set(StoreState::Mutated);
        self.persist();
        self.observers.emit(&self.settings());
    }

    fn persist(&self) {
        let snapshot = self.settings();
        match serde_json::to_string(&*snapshot) {
            Ok(json) => match self.storage.set(SETTINGS_KEY, &json) {
                Ok(()) => {
                    self.state.set(StoreState::Persisted);
                    tracing::debug!("Saved settings ({} bytes)", json.len());
                }
                Err(e) => tracing::warn!("Failed to save settings: {}", e),
            },
            Err(e) => tracing::warn!("Failed to serialize settings: {}", e),
        }
        self.write_legacy_theme();
    }

    fn write_legacy_theme(&self) {
        let theme = self.effective_theme();
        if let Err(e) = self.storage.set(LEGACY_THEME_KEY, theme.as_str()) {
            tracing::warn!("Failed to save theme: {}", e);
        }
    }
}

fn read_snapshot(storage: &dyn KeyValueStore) -> ApplicationSettings {
    let json = match storage.get(SETTINGS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => {
            tracing::debug!("No saved settings, using defaults");
            return ApplicationSettings::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read settings, using defaults: {}", e);
            return ApplicationSettings::default();
        }
    };

    match serde_json::from_str::<Value>(&json) {
        Ok(value) => {
            tracing::debug!("Loaded settings ({} bytes)", json.len());
            ApplicationSettings::from_snapshot(&value)
        }
        Err(e) => {
            tracing::warn!("Saved settings are corrupt, using defaults: {}", e);
            ApplicationSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EditorSettings, ManualColorScheme, UiSettings};
    use crate::storage::{FileStore, MemoryStore, StorageError};
    use std::io;
    use tempfile::TempDir;

    /// Memory store whose writes can be made to fail
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Rc<Cell<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.get() {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.inner.set(key, value)
        }
    }

    /// Storage whose reads always fail
    struct UnreadableStore;

    impl KeyValueStore for UnreadableStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn light_host() -> Rc<ManualColorScheme> {
        Rc::new(ManualColorScheme::new(false))
    }

    fn stored(storage: &MemoryStore) -> Value {
        let json = storage.get(SETTINGS_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_load_merges_persisted_categories() {
        let storage = MemoryStore::with_entry(
            SETTINGS_KEY,
            r#"{"editor":{"fontSize":20},"ui":{"theme":"dark"}}"#,
        );
        let store = SettingsStore::load(storage, light_host());
        let settings = store.settings();

        let mut expected = ApplicationSettings::default();
        expected.editor.font_size = 20;
        expected.ui.theme = Theme::Dark;
        assert_eq!(*settings, expected);
        assert_eq!(store.state(), StoreState::Loaded);
        assert_eq!(store.effective_theme(), ResolvedTheme::Dark);
    }

    #[test]
    fn test_missing_or_corrupt_storage_gives_defaults() {
        let empty = SettingsStore::load(MemoryStore::new(), light_host());
        assert_eq!(*empty.settings(), ApplicationSettings::default());

        let corrupt = SettingsStore::load(
            MemoryStore::with_entry(SETTINGS_KEY, "{not json"),
            light_host(),
        );
        assert_eq!(*corrupt.settings(), ApplicationSettings::default());

        let unreadable = SettingsStore::load(UnreadableStore, light_host());
        assert_eq!(*unreadable.settings(), ApplicationSettings::default());
    }

    #[test]
    fn test_update_changes_one_category_and_persists() {
        let storage = MemoryStore::new();
        let store = SettingsStore::load(storage.clone(), light_host());

        store.update(|editor: &mut EditorSettings| editor.font_size = 16);

        let mut expected = ApplicationSettings::default();
        expected.editor.font_size = 16;
        assert_eq!(*store.settings(), expected);
        assert_eq!(store.state(), StoreState::Persisted);
        assert_eq!(stored(&storage)["editor"]["fontSize"], 16);
    }

    #[test]
    fn test_update_clamps_bounded_fields() {
        let store = SettingsStore::load(MemoryStore::new(), light_host());
        store.update(|editor: &mut EditorSettings| {
            editor.font_size = 2;
            editor.tab_size = 99;
        });
        store.update(|ui: &mut UiSettings| ui.sidebar_width = 5_000);

        let settings = store.settings();
        assert_eq!(settings.editor.font_size, 8);
        assert_eq!(settings.editor.tab_size, 8);
        assert_eq!(settings.ui.sidebar_width, 600);
    }

    #[test]
    fn test_round_trip_through_storage() {
        let storage = MemoryStore::with_entry(
            SETTINGS_KEY,
            r#"{"editor":{"fontSize":20,"minimap":true},"github":{"username":"octo"}}"#,
        );
        let first = SettingsStore::load(storage.clone(), light_host());
        let loaded = first.settings();
        first.update(|_: &mut EditorSettings| {});

        let second = SettingsStore::load(storage, light_host());
        assert_eq!(second.settings(), loaded);
    }

    #[test]
    fn test_reset_single_category() {
        let store = SettingsStore::load(MemoryStore::new(), light_host());
        store.update(|editor: &mut EditorSettings| editor.word_wrap = false);
        store.update(|ui: &mut UiSettings| {
            ui.theme = Theme::Dark;
            ui.compact_mode = true;
        });

        store.reset(Some(Category::Ui));
        let settings = store.settings();
        assert_eq!(settings.ui, UiSettings::default());
        assert!(!settings.editor.word_wrap);

        store.reset(None);
        assert_eq!(*store.settings(), ApplicationSettings::default());
    }

    #[test]
    fn test_write_failure_keeps_memory_and_stays_dirty() {
        let storage = FlakyStore::default();
        let store = SettingsStore::load(storage.clone(), light_host());

        storage.failing.set(true);
        store.update(|editor: &mut EditorSettings| editor.font_size = 18);
        assert_eq!(store.settings().editor.font_size, 18);
        assert!(store.is_dirty());
        assert_eq!(storage.inner.get(SETTINGS_KEY).unwrap(), None);

        storage.failing.set(false);
        store.update(|editor: &mut EditorSettings| editor.tab_size = 2);
        assert!(!store.is_dirty());
        assert_eq!(stored(&storage.inner)["editor"]["fontSize"], 18);
    }

    #[test]
    fn test_observers_receive_each_snapshot() {
        let store = SettingsStore::load(MemoryStore::new(), light_host());
        let sizes = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&sizes);
        let id = store.subscribe(move |settings| log.borrow_mut().push(settings.editor.font_size));

        store.update(|editor: &mut EditorSettings| editor.font_size = 16);
        store.update(|editor: &mut EditorSettings| editor.font_size = 18);
        assert!(store.unsubscribe(id));
        store.update(|editor: &mut EditorSettings| editor.font_size = 20);

        assert_eq!(*sizes.borrow(), vec![16, 18]);
    }

    #[test]
    fn test_observer_may_read_the_store() {
        let store = Rc::new(SettingsStore::load(MemoryStore::new(), light_host()));
        let seen = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&store);
        let out = Rc::clone(&seen);
        store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                out.set(Some(store.effective_theme()));
            }
        });

        store.update(|ui: &mut UiSettings| ui.theme = Theme::Dark);
        assert_eq!(seen.get(), Some(ResolvedTheme::Dark));
    }

    #[test]
    fn test_system_theme_follows_host() {
        let host = light_host();
        let storage = MemoryStore::new();
        let store = Rc::new(SettingsStore::load(storage.clone(), host.clone()));
        let watch = store.watch_color_scheme();

        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        store.subscribe(move |_| counter.set(counter.get() + 1));

        assert_eq!(store.effective_theme(), ResolvedTheme::Light);
        host.set_prefers_dark(true);
        assert_eq!(store.effective_theme(), ResolvedTheme::Dark);
        assert_eq!(notified.get(), 1);
        assert_eq!(store.settings().ui.theme, Theme::System);
        assert_eq!(storage.get(LEGACY_THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), None);

        drop(watch);
        assert_eq!(host.subscriber_count(), 0);
        host.set_prefers_dark(false);
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_host_change_ignored_for_explicit_theme() {
        let host = light_host();
        let store = Rc::new(SettingsStore::load(MemoryStore::new(), host.clone()));
        let _watch = store.watch_color_scheme();
        store.update(|ui: &mut UiSettings| ui.theme = Theme::Light);

        let notified = Rc::new(Cell::new(0));
        let counter = Rc::clone(&notified);
        store.subscribe(move |_| counter.set(counter.get() + 1));

        host.set_prefers_dark(true);
        assert_eq!(notified.get(), 0);
        assert_eq!(store.effective_theme(), ResolvedTheme::Light);
    }

    #[test]
    fn test_legacy_theme_written_on_update() {
        let storage = MemoryStore::new();
        let store = SettingsStore::load(storage.clone(), light_host());

        store.update(|ui: &mut UiSettings| ui.theme = Theme::Dark);
        assert_eq!(storage.get(LEGACY_THEME_KEY).unwrap().as_deref(), Some("dark"));

        store.reset(Some(Category::Ui));
        assert_eq!(storage.get(LEGACY_THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_export_then_import() {
        let source = SettingsStore::load(MemoryStore::new(), light_host());
        source.update(|editor: &mut EditorSettings| editor.font_family = "Iosevka".to_string());
        let exported = source.export_json().unwrap();
        assert!(exported.contains("\n"));

        let target = SettingsStore::load(MemoryStore::new(), light_host());
        target.import_json(&exported).unwrap();
        assert_eq!(target.settings(), source.settings());
        assert_eq!(target.state(), StoreState::Persisted);
    }

    #[test]
    fn test_import_rejects_malformed_input() {
        let store = SettingsStore::load(MemoryStore::new(), light_host());
        assert!(matches!(store.import_json("{oops"), Err(SettingsError::Parse(_))));
        assert!(matches!(store.import_json("[1]"), Err(SettingsError::NotAnObject)));
        assert_eq!(store.state(), StoreState::Loaded);
    }

    #[test]
    fn test_file_store_persistence() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::load(FileStore::new(dir.path()), light_host());
        store.update(|ui: &mut UiSettings| ui.sidebar_visible = false);

        let reopened = SettingsStore::load(FileStore::new(dir.path()), light_host());
        assert!(!reopened.settings().ui.sidebar_visible);
        assert!(dir.path().join(SETTINGS_KEY).exists());
        assert!(dir.path().join(LEGACY_THEME_KEY).exists());
    }
}
