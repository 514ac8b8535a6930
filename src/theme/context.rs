use leptos::prelude::*;
use tracing::debug;

use super::host::{StorageChange, SystemTheme};
use super::store::{ThemeSnapshot, ThemeStore, ThemeUpdate};

/// Handle to the authoritative store plus the signal its snapshots are
/// published on. Copyable; the store itself lives in the reactive arena and
/// is dropped (unsubscribing its listeners) with the owning provider.
#[derive(Clone, Copy)]
pub struct ThemeHandle {
    store: StoredValue<ThemeStore, LocalStorage>,
    state: RwSignal<ThemeSnapshot>,
}

impl ThemeHandle {
    pub fn new(store: ThemeStore) -> Self {
        let state = RwSignal::new(store.snapshot());
        Self {
            store: StoredValue::new_local(store),
            state,
        }
    }

    /// Run `f` against the store, then publish the new snapshot.
    fn update<U>(&self, f: impl FnOnce(&mut ThemeStore) -> U) -> Option<U> {
        let (result, snapshot) = self.store.try_update_value(|store| {
            let result = f(store);
            (result, store.snapshot())
        })?;
        if self.state.try_with_untracked(|current| *current != snapshot) == Some(true) {
            self.state.set(snapshot);
        }
        Some(result)
    }

    pub fn set_theme(&self, update: impl Into<ThemeUpdate>) {
        let update = update.into();
        if self.update(|store| store.set_theme(update)).is_none() {
            debug!("set_theme called after the theme provider was disposed");
        }
    }

    pub fn set_forced_theme(&self, forced: Option<String>) {
        self.update(|store| store.set_forced_theme(forced));
    }

    pub fn handle_system_change(&self, theme: SystemTheme) {
        self.update(|store| store.handle_system_change(theme));
    }

    pub fn handle_storage_change(&self, change: &StorageChange) {
        self.update(|store| store.handle_storage_change(change));
    }

    pub(crate) fn with_store<U>(&self, f: impl FnOnce(&mut ThemeStore) -> U) -> Option<U> {
        self.store.try_update_value(f)
    }

    pub fn state(&self) -> ReadSignal<ThemeSnapshot> {
        self.state.read_only()
    }
}

/// What `use_theme` hands to consumers. Outside any provider it is inert:
/// every field is empty and `set_theme` does nothing.
#[derive(Clone, Copy, Default)]
pub struct ThemeContext {
    handle: Option<ThemeHandle>,
}

impl ThemeContext {
    pub fn new(handle: ThemeHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Whether this context is backed by a mounted provider.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    fn read<U>(&self, f: impl FnOnce(&ThemeSnapshot) -> U) -> Option<U> {
        self.handle.and_then(|h| h.state.try_with(f))
    }

    /// The selected theme; may be `"system"`.
    pub fn theme(&self) -> Option<String> {
        self.read(|s| s.theme.clone()).flatten()
    }

    pub fn forced_theme(&self) -> Option<String> {
        self.read(|s| s.forced_theme.clone()).flatten()
    }

    pub fn resolved_theme(&self) -> Option<String> {
        self.read(|s| s.resolved_theme.clone()).flatten()
    }

    pub fn system_theme(&self) -> Option<SystemTheme> {
        self.read(|s| s.system_theme).flatten()
    }

    /// Configured themes, with `"system"` when system theming is enabled.
    pub fn themes(&self) -> Vec<String> {
        self.read(|s| s.themes.clone()).unwrap_or_default()
    }

    pub fn set_theme(&self, update: impl Into<ThemeUpdate>) {
        match &self.handle {
            Some(handle) => handle.set_theme(update),
            None => debug!("set_theme called outside a ThemeProvider; ignored"),
        }
    }

    pub fn handle(&self) -> Option<ThemeHandle> {
        self.handle
    }
}

/// The nearest provider's context, or the inert default.
pub fn use_theme() -> ThemeContext {
    use_context::<ThemeContext>().unwrap_or_default()
}
