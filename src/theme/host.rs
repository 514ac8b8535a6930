//! The browser primitives the theme system touches, behind traits so the
//! reconciler can run against `web-sys` or an in-memory stand-in.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

use super::config::{DARK, LIGHT};

pub const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// OS-reported color-scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemTheme {
    Light,
    Dark,
}

impl SystemTheme {
    pub fn from_prefers_dark(matches: bool) -> Self {
        if matches {
            SystemTheme::Dark
        } else {
            SystemTheme::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemTheme::Light => LIGHT,
            SystemTheme::Dark => DARK,
        }
    }
}

impl fmt::Display for SystemTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write to the shared store made by another browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// `None` when the whole store was cleared.
    pub key: Option<String>,
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: Some(value.into()),
        }
    }

    pub fn removed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: None,
        }
    }
}

/// Keeps an event listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    on_drop: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription that was never registered, e.g. when the API is missing.
    pub fn detached() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.on_drop.is_some())
            .finish()
    }
}

/// Held while CSS transitions are suppressed; dropping it re-enables them.
pub struct TransitionGuard {
    restore: Option<Box<dyn FnOnce()>>,
}

impl TransitionGuard {
    pub fn new(restore: impl FnOnce() + 'static) -> Self {
        Self {
            restore: Some(Box::new(restore)),
        }
    }

    pub fn noop() -> Self {
        Self { restore: None }
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

/// Synchronous, per-origin key/value store shared across tabs.
pub trait ThemeStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ThemeError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ThemeError>;
    /// Listen for writes made by other browsing contexts.
    fn subscribe(&self, on_change: Rc<dyn Fn(StorageChange)>) -> Subscription;
}

/// The OS color-scheme media query.
pub trait ColorSchemePreference {
    /// `None` when the platform exposes no preference API.
    fn current(&self) -> Option<SystemTheme>;
    fn subscribe(&self, on_change: Rc<dyn Fn(SystemTheme)>) -> Subscription;
}

/// The document root element.
pub trait ThemeDocument {
    fn remove_classes(&self, classes: &[String]) -> Result<(), ThemeError>;
    fn add_class(&self, class: &str) -> Result<(), ThemeError>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), ThemeError>;
    fn remove_attribute(&self, name: &str) -> Result<(), ThemeError>;
    /// `None` clears the property.
    fn set_color_scheme(&self, scheme: Option<&str>) -> Result<(), ThemeError>;
    /// Disable every CSS transition until the guard is dropped.
    fn suppress_transitions(&self) -> Result<TransitionGuard, ThemeError>;
}

/// Bundle of the three primitives, cheap to clone.
#[derive(Clone)]
pub struct Host {
    pub storage: Rc<dyn ThemeStorage>,
    pub preference: Rc<dyn ColorSchemePreference>,
    pub document: Rc<dyn ThemeDocument>,
}

impl Host {
    pub fn new(
        storage: Rc<dyn ThemeStorage>,
        preference: Rc<dyn ColorSchemePreference>,
        document: Rc<dyn ThemeDocument>,
    ) -> Self {
        Self {
            storage,
            preference,
            document,
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
