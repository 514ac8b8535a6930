use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::apply::apply_theme;
use super::config::{ThemeConfig, SYSTEM};
use super::host::{Host, StorageChange, Subscription, SystemTheme};

/// Input to `set_theme`: a literal name or a function of the current one.
#[derive(Clone)]
pub enum ThemeUpdate {
    Set(String),
    Map(Rc<dyn Fn(&str) -> String>),
}

impl ThemeUpdate {
    pub fn map(f: impl Fn(&str) -> String + 'static) -> Self {
        ThemeUpdate::Map(Rc::new(f))
    }

    fn resolve(self, current: &str) -> String {
        match self {
            ThemeUpdate::Set(theme) => theme,
            ThemeUpdate::Map(f) => f(current),
        }
    }
}

impl From<String> for ThemeUpdate {
    fn from(theme: String) -> Self {
        ThemeUpdate::Set(theme)
    }
}

impl From<&str> for ThemeUpdate {
    fn from(theme: &str) -> Self {
        ThemeUpdate::Set(theme.to_string())
    }
}

impl From<SystemTheme> for ThemeUpdate {
    fn from(theme: SystemTheme) -> Self {
        ThemeUpdate::Set(theme.as_str().to_string())
    }
}

impl fmt::Debug for ThemeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeUpdate::Set(theme) => f.debug_tuple("Set").field(theme).finish(),
            ThemeUpdate::Map(_) => f.write_str("Map(..)"),
        }
    }
}

/// Observable state, copied out after every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSnapshot {
    pub theme: Option<String>,
    pub forced_theme: Option<String>,
    pub resolved_theme: Option<String>,
    pub system_theme: Option<SystemTheme>,
    pub themes: Vec<String>,
}

/// Theme state for one authoritative provider.
///
/// Constructing it with [`ThemeStore::mount`] is the only transition out of
/// the uninitialized state; afterwards it only reacts to `set_theme`, OS
/// preference changes, storage changes and forced-theme changes. Every
/// reaction that changes the effective theme re-applies it to the document.
pub struct ThemeStore {
    config: ThemeConfig,
    host: Host,
    selected: String,
    forced: Option<String>,
    system: Option<SystemTheme>,
    /// Last value known to be in storage under `storage_key`.
    persisted: Option<String>,
    subscriptions: Vec<Subscription>,
}

impl ThemeStore {
    /// Read storage and the OS preference, then apply the effective theme.
    /// Nothing is written to storage here.
    pub fn mount(config: ThemeConfig, host: Host) -> Self {
        let persisted = match host.storage.get_item(&config.storage_key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read theme preference '{}': {}", config.storage_key, e);
                None
            }
        };
        let selected = persisted
            .clone()
            .unwrap_or_else(|| config.default_theme().to_string());
        let system = if config.enable_system {
            host.preference.current()
        } else {
            None
        };
        let forced = config.forced_theme.clone();

        info!(
            "Mounted theme store (selected {}, forced {:?}, system {:?})",
            selected, forced, system
        );

        let store = Self {
            config,
            host,
            selected,
            forced,
            system,
            persisted,
            subscriptions: Vec::new(),
        };
        store.apply_current();
        store
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn selected_theme(&self) -> &str {
        &self.selected
    }

    pub fn forced_theme(&self) -> Option<&str> {
        self.forced.as_deref()
    }

    pub fn system_theme(&self) -> Option<SystemTheme> {
        self.system
    }

    /// Forced theme if set; otherwise the system theme when `"system"` is
    /// selected with system theming on; otherwise the selected theme.
    pub fn resolved_theme(&self) -> Option<String> {
        if let Some(forced) = &self.forced {
            return Some(forced.clone());
        }
        if self.selected == SYSTEM && self.config.enable_system {
            return self.system.map(|s| s.as_str().to_string());
        }
        Some(self.selected.clone())
    }

    pub fn available_themes(&self) -> Vec<String> {
        self.config.available_themes()
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        ThemeSnapshot {
            theme: Some(self.selected.clone()),
            forced_theme: self.forced.clone(),
            resolved_theme: self.resolved_theme(),
            system_theme: self.system,
            themes: self.available_themes(),
        }
    }

    /// Keep an event subscription alive for as long as this store lives.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Select a theme and persist it. Names are not validated; an unknown
    /// name simply produces no DOM token.
    ///
    /// Writing the untouched default would pin it, so that write is skipped
    /// until something has actually been persisted.
    pub fn set_theme(&mut self, update: impl Into<ThemeUpdate>) {
        let next = update.into().resolve(&self.selected);
        let persist = self.persisted.is_some() || next != self.config.default_theme();
        self.commit(next, persist);
    }

    fn commit(&mut self, next: String, persist: bool) {
        let changed = next != self.selected;
        self.selected = next;

        if persist {
            match self
                .host
                .storage
                .set_item(&self.config.storage_key, &self.selected)
            {
                Ok(()) => self.persisted = Some(self.selected.clone()),
                Err(e) => warn!("Failed to save theme preference: {}", e),
            }
        }

        if changed {
            debug!("Theme set to {}", self.selected);
            self.apply_current();
        }
    }

    pub fn set_forced_theme(&mut self, forced: Option<String>) {
        if forced == self.forced {
            return;
        }
        debug!("Forced theme changed: {:?} -> {:?}", self.forced, forced);
        self.forced = forced;
        self.apply_current();
    }

    pub fn handle_system_change(&mut self, theme: SystemTheme) {
        if !self.config.enable_system {
            return;
        }
        debug!("System theme changed to {}", theme);
        self.system = Some(theme);
        if self.selected == SYSTEM && self.forced.is_none() {
            self.apply(Some(SYSTEM));
        }
    }

    /// Another tab wrote to storage. Only `storage_key` matters. The new value,
    /// or the default theme when the key was deleted, is selected and written
    /// back like any other `set_theme` input.
    pub fn handle_storage_change(&mut self, change: &StorageChange) {
        if change.key.as_deref() != Some(self.config.storage_key.as_str()) {
            return;
        }
        debug!("Theme preference changed in another tab: {:?}", change.new_value);
        let next = change
            .new_value
            .clone()
            .unwrap_or_else(|| self.config.default_theme().to_string());
        self.commit(next, true);
    }

    fn apply_current(&self) {
        let name = self.forced.as_deref().unwrap_or(&self.selected);
        self.apply(Some(name));
    }

    fn apply(&self, name: Option<&str>) {
        if let Err(e) = apply_theme(&self.config, name, &self.host) {
            warn!("Failed to apply theme {:?}: {}", name, e);
        }
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("selected", &self.selected)
            .field("forced", &self.forced)
            .field("system", &self.system)
            .field("persisted", &self.persisted)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::config::Attribute;
    use crate::theme::memory::MemoryHost;

    fn mount(config: ThemeConfig) -> (ThemeStore, MemoryHost) {
        let mem = MemoryHost::new();
        let store = ThemeStore::mount(config, mem.host());
        (store, mem)
    }

    #[test]
    fn test_mount_defaults_to_system() {
        let (store, mem) = mount(ThemeConfig::new());
        assert_eq!(store.selected_theme(), "system");
        assert_eq!(store.system_theme(), Some(SystemTheme::Light));
        assert_eq!(store.resolved_theme(), Some("light".to_string()));
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
        assert_eq!(mem.storage.reads(), vec!["theme"]);
        assert!(mem.storage.writes().is_empty());
    }

    #[test]
    fn test_mount_restores_persisted() {
        let mem = MemoryHost::new();
        mem.storage.insert("theme", "dark");
        let store = ThemeStore::mount(ThemeConfig::new(), mem.host());
        assert_eq!(store.selected_theme(), "dark");
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_mount_survives_storage_failure() {
        let mem = MemoryHost::new();
        mem.storage.fail_with(Some("SecurityError"));
        let store = ThemeStore::mount(ThemeConfig::new().with_default_theme("dark"), mem.host());
        assert_eq!(store.selected_theme(), "dark");
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_set_theme_writes_once() {
        let (mut store, mem) = mount(ThemeConfig::new());
        store.set_theme("dark");
        assert_eq!(
            mem.storage.writes(),
            vec![("theme".to_string(), "dark".to_string())]
        );
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_set_theme_to_untouched_default_does_not_write() {
        let (mut store, mem) = mount(ThemeConfig::new().with_default_theme("dark"));
        store.set_theme("dark");
        assert!(mem.storage.writes().is_empty());
        assert_eq!(mem.storage.value("theme"), None);

        // once something is persisted, returning to the default is recorded
        store.set_theme("light");
        store.set_theme("dark");
        assert_eq!(mem.storage.writes().len(), 2);
        assert_eq!(mem.storage.value("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_set_theme_with_function() {
        let (mut store, _mem) = mount(ThemeConfig::new().with_default_theme("light"));
        let toggle = ThemeUpdate::map(|t| if t == "light" { "dark".into() } else { "light".into() });

        store.set_theme(toggle.clone());
        assert_eq!(store.selected_theme(), "dark");
        assert_eq!(store.resolved_theme(), Some("dark".to_string()));

        store.set_theme(toggle);
        assert_eq!(store.selected_theme(), "light");
    }

    #[test]
    fn test_system_change_reapplies_only_for_system() {
        let (mut store, mem) = mount(ThemeConfig::new());
        mem.preference.set(Some(SystemTheme::Dark));
        store.handle_system_change(SystemTheme::Dark);
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
        assert_eq!(store.resolved_theme(), Some("dark".to_string()));

        store.set_theme("light");
        mem.preference.set(Some(SystemTheme::Light));
        store.handle_system_change(SystemTheme::Light);
        mem.preference.set(Some(SystemTheme::Dark));
        store.handle_system_change(SystemTheme::Dark);
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
        assert_eq!(store.system_theme(), Some(SystemTheme::Dark));
    }

    #[test]
    fn test_system_change_ignored_while_forced() {
        let (mut store, mem) = mount(ThemeConfig::new().with_forced_theme(Some("light".into())));
        mem.preference.set(Some(SystemTheme::Dark));
        store.handle_system_change(SystemTheme::Dark);
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
        assert_eq!(store.system_theme(), Some(SystemTheme::Dark));
    }

    #[test]
    fn test_system_not_tracked_when_disabled() {
        let (mut store, _mem) = mount(ThemeConfig::new().with_enable_system(false));
        store.handle_system_change(SystemTheme::Dark);
        assert_eq!(store.system_theme(), None);
        assert_eq!(store.selected_theme(), "light");
        assert_eq!(store.resolved_theme(), Some("light".to_string()));
    }

    #[test]
    fn test_storage_change_for_other_key_ignored() {
        let (mut store, mem) = mount(ThemeConfig::new());
        store.handle_storage_change(&StorageChange::set("other", "dark"));
        store.handle_storage_change(&StorageChange {
            key: None,
            new_value: None,
        });
        assert_eq!(store.selected_theme(), "system");
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
    }

    #[test]
    fn test_storage_change_applies_and_deletion_falls_back() {
        let (mut store, mem) = mount(ThemeConfig::new().with_default_theme("light"));
        let change = StorageChange::set("theme", "dark");
        mem.storage.external_change(change.clone());
        store.handle_storage_change(&change);
        assert_eq!(store.selected_theme(), "dark");
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));

        let change = StorageChange::removed("theme");
        mem.storage.external_change(change.clone());
        store.handle_storage_change(&change);
        assert_eq!(store.selected_theme(), "light");
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
        // the default is written back in place of the deleted key
        assert_eq!(mem.storage.value("theme"), Some("light".to_string()));
        assert_eq!(
            mem.storage.writes().last(),
            Some(&("theme".to_string(), "light".to_string()))
        );
    }

    #[test]
    fn test_forced_theme_is_independent_of_selection() {
        let mem = MemoryHost::new();
        mem.storage.insert("theme", "dark");
        let config = ThemeConfig::new()
            .with_attribute(Attribute::Class)
            .with_forced_theme(Some("light".into()));
        let mut store = ThemeStore::mount(config, mem.host());

        assert_eq!(store.selected_theme(), "dark");
        assert_eq!(store.resolved_theme(), Some("light".to_string()));
        assert_eq!(mem.document.classes(), vec!["light"]);

        store.set_theme("system");
        assert_eq!(mem.document.classes(), vec!["light"]);
        assert_eq!(mem.storage.value("theme"), Some("system".to_string()));

        store.set_forced_theme(None);
        assert_eq!(store.resolved_theme(), Some("light".to_string()));
        assert_eq!(store.selected_theme(), "system");
        assert_eq!(mem.document.classes(), vec!["light"]);
    }

    #[test]
    fn test_removing_forced_theme_reapplies_selection() {
        let config = ThemeConfig::new()
            .with_default_theme("dark")
            .with_forced_theme(Some("light".into()));
        let (mut store, mem) = mount(config);
        assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));

        store.set_forced_theme(None);
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
        assert!(mem.storage.writes().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let (store, _mem) = mount(ThemeConfig::new().with_default_theme("dark"));
        assert_eq!(
            store.snapshot(),
            ThemeSnapshot {
                theme: Some("dark".to_string()),
                forced_theme: None,
                resolved_theme: Some("dark".to_string()),
                system_theme: Some(SystemTheme::Light),
                themes: vec!["light".into(), "dark".into(), "system".into()],
            }
        );
    }

    #[test]
    fn test_same_theme_does_not_touch_document() {
        let (mut store, mem) = mount(ThemeConfig::new().with_default_theme("light"));
        store.set_theme("dark");
        let mutations = mem.document.mutation_count();
        store.set_theme("dark");
        assert_eq!(mem.document.mutation_count(), mutations);
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
    }
}
