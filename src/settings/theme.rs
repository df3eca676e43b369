//! Theme preference and the host colour-scheme signal

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::listeners::{Listeners, SubscriptionId};

/// Theme chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the host's light/dark preference
    #[default]
    System,
}

/// Theme actually applied to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    /// Resolve against the host preference
    pub fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if prefers_dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }
}

impl ResolvedTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host signal for the preferred light/dark colour scheme.
///
/// Change notifications carry no payload; listeners re-query
/// [`prefers_dark`](ColorSchemeSource::prefers_dark).
pub trait ColorSchemeSource {
    /// Current host preference, queried live
    fn prefers_dark(&self) -> bool;

    fn subscribe(&self, callback: Rc<dyn Fn()>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Colour scheme whose preference is set by the embedding host
#[derive(Default)]
pub struct ManualColorScheme {
    prefers_dark: Cell<bool>,
    listeners: Listeners<()>,
}

impl ManualColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: Cell::new(prefers_dark),
            listeners: Listeners::new(),
        }
    }

    /// Update the preference and notify subscribers if it changed
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        if self.prefers_dark.replace(prefers_dark) != prefers_dark {
            tracing::debug!("Host colour scheme changed (dark: {})", prefers_dark);
            self.listeners.emit(&());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ColorSchemeSource for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.get()
    }

    fn subscribe(&self, callback: Rc<dyn Fn()>) -> SubscriptionId {
        self.listeners.add(Rc::new(move |_: &()| callback()))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}

/// Keeps a colour-scheme subscription alive. Unsubscribes on drop.
pub struct ColorSchemeWatch {
    source: Rc<dyn ColorSchemeSource>,
    id: SubscriptionId,
}

impl ColorSchemeWatch {
    pub(crate) fn new(source: Rc<dyn ColorSchemeSource>, id: SubscriptionId) -> Self {
        Self { source, id }
    }
}

impl Drop for ColorSchemeWatch {
    fn drop(&mut self) {
        self.source.unsubscribe(self.id);
    }
}
