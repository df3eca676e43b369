//! User-editable application settings
//!
//! Settings are grouped into flat categories. A persisted snapshot is merged
//! over the compiled defaults one category at a time, so fields added in a
//! newer version pick up their defaults and fields dropped since are ignored.

pub mod listeners;
pub mod store;
pub mod theme;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use listeners::SubscriptionId;
pub use store::{SettingsError, SettingsStore, StoreState, LEGACY_THEME_KEY, SETTINGS_KEY};
pub use theme::{ColorSchemeSource, ColorSchemeWatch, ManualColorScheme, ResolvedTheme, Theme};

pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 8..=72;
pub const TAB_SIZE_RANGE: RangeInclusive<u32> = 1..=8;
pub const AUTO_SAVE_INTERVAL_RANGE: RangeInclusive<u64> = 1_000..=600_000;
pub const SIDEBAR_WIDTH_RANGE: RangeInclusive<u32> = 160..=600;

/// Complete user settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationSettings {
    pub editor: EditorSettings,
    pub github: GithubSettings,
    pub collaboration: CollaborationSettings,
    pub ui: UiSettings,
    pub keyboard_shortcuts: KeyboardShortcuts,
}

/// Editor behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    /// Font size in points
    pub font_size: u32,
    /// Empty = platform default
    pub font_family: String,
    /// Tab width in spaces
    pub tab_size: u32,
    pub word_wrap: bool,
    pub line_numbers: bool,
    pub spell_check: bool,
    pub auto_save: bool,
    /// Auto-save delay in milliseconds
    pub auto_save_interval: u64,
}

/// GitHub integration preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubSettings {
    pub username: String,
    pub default_branch: String,
    /// Push on save
    pub auto_sync: bool,
    pub commit_message_template: String,
}

/// Collaboration identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollaborationSettings {
    /// Name shown to other participants
    pub user_name: String,
    /// Cursor colour as a hex string
    pub user_color: String,
    pub show_cursors: bool,
    pub show_presence: bool,
}

/// Window and theme preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiSettings {
    pub theme: Theme,
    pub sidebar_visible: bool,
    /// Sidebar width in pixels
    pub sidebar_width: u32,
    pub show_status_bar: bool,
    pub compact_mode: bool,
}

/// Keyboard accelerators, one per editor action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyboardShortcuts {
    pub save: String,
    pub open: String,
    pub new_document: String,
    pub find: String,
    pub replace: String,
    pub toggle_sidebar: String,
    pub bold: String,
    pub italic: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 14,
            font_family: String::new(),
            tab_size: 4,
            word_wrap: true,
            line_numbers: true,
            spell_check: true,
            auto_save: true,
            auto_save_interval: 30_000,
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            default_branch: "main".to_string(),
            auto_sync: false,
            commit_message_template: "Update {filename}".to_string(),
        }
    }
}

impl Default for CollaborationSettings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            user_color: "#3b82f6".to_string(),
            show_cursors: true,
            show_presence: true,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            sidebar_visible: true,
            sidebar_width: 260,
            show_status_bar: true,
            compact_mode: false,
        }
    }
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        Self {
            save: "CmdOrCtrl+S".to_string(),
            open: "CmdOrCtrl+O".to_string(),
            new_document: "CmdOrCtrl+N".to_string(),
            find: "CmdOrCtrl+F".to_string(),
            replace: "CmdOrCtrl+H".to_string(),
            toggle_sidebar: "CmdOrCtrl+\\".to_string(),
            bold: "CmdOrCtrl+B".to_string(),
            italic: "CmdOrCtrl+I".to_string(),
        }
    }
}

/// Settings category names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Editor,
    Github,
    Collaboration,
    Ui,
    KeyboardShortcuts,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Editor,
        Category::Github,
        Category::Collaboration,
        Category::Ui,
        Category::KeyboardShortcuts,
    ];

    /// Key used in the persisted snapshot
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Editor => "editor",
            Category::Github => "github",
            Category::Collaboration => "collaboration",
            Category::Ui => "ui",
            Category::KeyboardShortcuts => "keyboardShortcuts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown settings category: {}", s))
    }
}

/// One settings category, addressable by type
pub trait SettingsCategory: Clone + Default + Serialize + DeserializeOwned + 'static {
    const CATEGORY: Category;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self;

    /// Pull bounded fields back into range
    fn clamp(&mut self) {}
}

impl SettingsCategory for EditorSettings {
    const CATEGORY: Category = Category::Editor;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self {
        &mut settings.editor
    }

    fn clamp(&mut self) {
        self.font_size = clamp_to(self.font_size, &FONT_SIZE_RANGE);
        self.tab_size = clamp_to(self.tab_size, &TAB_SIZE_RANGE);
        self.auto_save_interval = clamp_to(self.auto_save_interval, &AUTO_SAVE_INTERVAL_RANGE);
    }
}

impl SettingsCategory for GithubSettings {
    const CATEGORY: Category = Category::Github;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self {
        &mut settings.github
    }
}

impl SettingsCategory for CollaborationSettings {
    const CATEGORY: Category = Category::Collaboration;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self {
        &mut settings.collaboration
    }
}

impl SettingsCategory for UiSettings {
    const CATEGORY: Category = Category::Ui;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self {
        &mut settings.ui
    }

    fn clamp(&mut self) {
        self.sidebar_width = clamp_to(self.sidebar_width, &SIDEBAR_WIDTH_RANGE);
    }
}

impl SettingsCategory for KeyboardShortcuts {
    const CATEGORY: Category = Category::KeyboardShortcuts;

    fn of_mut(settings: &mut ApplicationSettings) -> &mut Self {
        &mut settings.keyboard_shortcuts
    }
}

fn clamp_to<T: Ord + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    value.clamp(*range.start(), *range.end())
}

impl ApplicationSettings {
    /// Merge a persisted snapshot over the defaults, category by category.
    ///
    /// Each category is a one-level merge: persisted fields replace default
    /// fields, unknown fields are dropped, and a field whose value does not
    /// fit its type keeps the default.
    pub fn from_snapshot(snapshot: &Value) -> Self {
        let mut settings = Self::default();
        let Some(categories) = snapshot.as_object() else {
            tracing::warn!("Saved settings are not an object, using defaults");
            return settings;
        };

        merge_category::<EditorSettings>(&mut settings, categories);
        merge_category::<GithubSettings>(&mut settings, categories);
        merge_category::<CollaborationSettings>(&mut settings, categories);
        merge_category::<UiSettings>(&mut settings, categories);
        merge_category::<KeyboardShortcuts>(&mut settings, categories);
        settings
    }

    /// Replace one category with its default
    pub fn reset_category(&mut self, category: Category) {
        match category {
            Category::Editor => self.editor = EditorSettings::default(),
            Category::Github => self.github = GithubSettings::default(),
            Category::Collaboration => self.collaboration = CollaborationSettings::default(),
            Category::Ui => self.ui = UiSettings::default(),
            Category::KeyboardShortcuts => self.keyboard_shortcuts = KeyboardShortcuts::default(),
        }
    }

    /// Pull every bounded field back into range
    pub fn clamp(&mut self) {
        self.editor.clamp();
        self.github.clamp();
        self.collaboration.clamp();
        self.ui.clamp();
        self.keyboard_shortcuts.clamp();
    }
}

fn merge_category<C: SettingsCategory>(
    settings: &mut ApplicationSettings,
    categories: &Map<String, Value>,
) {
    let name = C::CATEGORY.as_str();
    let Some(persisted) = categories.get(name) else {
        return;
    };
    let Some(fields) = persisted.as_object() else {
        tracing::warn!("Ignoring saved settings category {}: not an object", name);
        return;
    };

    let mut merged = match serde_json::to_value(C::default()) {
        Ok(Value::Object(defaults)) => defaults,
        _ => return,
    };

    for (key, value) in fields {
        if !merged.contains_key(key) {
            tracing::debug!("Ignoring obsolete setting {}.{}", name, key);
            continue;
        }
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        if serde_json::from_value::<C>(Value::Object(candidate.clone())).is_ok() {
            merged = candidate;
        } else {
            tracing::warn!("Ignoring invalid setting {}.{} = {}", name, key, value);
        }
    }

    match serde_json::from_value::<C>(Value::Object(merged)) {
        Ok(mut category) => {
            category.clamp();
            *C::of_mut(settings) = category;
        }
        Err(e) => tracing::warn!("Ignoring saved settings category {}: {}", name, e),
    }
}
