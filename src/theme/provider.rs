use std::collections::BTreeMap;
use std::rc::Rc;

use leptos::prelude::*;
use tracing::{debug, warn};

use super::config::{AttributeTargets, ThemeConfig};
use super::context::{use_theme, ThemeContext, ThemeHandle};
use super::host::{Host, StorageChange, SystemTheme};
use super::memory::MemoryHost;
use super::script::{self, ThemeScript};
use super::store::ThemeStore;
use super::web;

/// Result of mounting the outermost provider.
#[derive(Clone)]
pub struct ThemeMount {
    pub context: ThemeContext,
    /// Bootstrap payload, rendered into the page by `ThemeScript`.
    pub payload: String,
}

/// Mount a theme store under the current reactive owner and provide its
/// context. Returns `None` when an ancestor already provides one: nested
/// providers are pure passthroughs and touch neither state nor the document.
pub fn provide_theme(config: ThemeConfig, host: Host) -> Option<ThemeMount> {
    if use_context::<ThemeContext>().is_some() {
        debug!("Nested ThemeProvider ignored; the outermost provider stays authoritative");
        return None;
    }

    // Rendered by `ThemeScript`; the bootstrap sees only this payload.
    let payload = script::serialize(&config).unwrap_or_else(|e| {
        warn!("Failed to serialize theme config: {}", e);
        String::new()
    });

    let store = ThemeStore::mount(config, host.clone());
    let handle = ThemeHandle::new(store);

    let on_system: Rc<dyn Fn(SystemTheme)> =
        Rc::new(move |theme| handle.handle_system_change(theme));
    let on_storage: Rc<dyn Fn(StorageChange)> =
        Rc::new(move |change| handle.handle_storage_change(&change));
    let system_sub = host.preference.subscribe(on_system);
    let storage_sub = host.storage.subscribe(on_storage);
    handle.with_store(|store| {
        store.hold(system_sub);
        store.hold(storage_sub);
    });

    let context = ThemeContext::new(handle);
    provide_context(context);
    Some(ThemeMount { context, payload })
}

/// Browser host, or an in-memory one when there is no `window`.
fn default_host() -> Host {
    match web::browser_host() {
        Ok(host) => host,
        Err(e) => {
            warn!("Theme provider running without a browser: {}", e);
            MemoryHost::new().host()
        }
    }
}

/// Theme provider. Only the outermost instance in a tree does anything;
/// inner instances render their children unchanged.
#[component]
pub fn ThemeProvider(
    /// Theme applied regardless of the user's choice; reactive
    #[prop(optional, into)]
    forced_theme: MaybeProp<String>,
    #[prop(optional)] disable_transition_on_change: bool,
    #[prop(default = true)] enable_system: bool,
    #[prop(default = true)] enable_color_scheme: bool,
    /// Key used in localStorage, default `"theme"`
    #[prop(optional, into)]
    storage_key: Option<String>,
    /// Theme names, default `["light", "dark"]`
    #[prop(optional)]
    themes: Option<Vec<String>>,
    /// Default `"system"`, or `"light"` when system theming is off
    #[prop(optional, into)]
    default_theme: Option<String>,
    /// Where the token goes, default `data-theme`
    #[prop(optional, into)]
    attribute: Option<AttributeTargets>,
    /// Theme name to DOM token mapping
    #[prop(optional)]
    value: Option<BTreeMap<String, String>>,
    /// CSP nonce for the inline config block
    #[prop(optional, into)]
    nonce: MaybeProp<String>,
    children: Children,
) -> impl IntoView {
    if use_theme().is_active() {
        return children().into_any();
    }

    let nonce = nonce.get_untracked().filter(|n| !n.is_empty());
    let mut config = ThemeConfig::new()
        .with_enable_system(enable_system)
        .with_enable_color_scheme(enable_color_scheme)
        .with_disable_transition_on_change(disable_transition_on_change)
        .with_forced_theme(forced_theme.get_untracked())
        .with_nonce(nonce.clone());
    if let Some(key) = storage_key {
        config = config.with_storage_key(key);
    }
    if let Some(themes) = themes {
        config = config.with_themes(themes);
    }
    if let Some(theme) = default_theme {
        config = config.with_default_theme(theme);
    }
    if let Some(attribute) = attribute {
        config = config.with_attribute(attribute);
    }
    if let Some(value) = value {
        config = config.with_value(value);
    }

    let Some(mount) = provide_theme(config, default_host()) else {
        return children().into_any();
    };

    if let Some(handle) = mount.context.handle() {
        Effect::new(move |_| {
            handle.set_forced_theme(forced_theme.get());
        });
    }

    let script = (!mount.payload.is_empty())
        .then(|| view! { <ThemeScript payload=mount.payload nonce=nonce /> });
    view! {
        {script}
        {children()}
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::config::Attribute;

    #[test]
    fn test_outermost_provider_mounts() {
        let owner = Owner::new();
        owner.with(|| {
            let mem = MemoryHost::new();
            let mount = provide_theme(ThemeConfig::new(), mem.host()).unwrap();

            assert!(mount.payload.contains("\"storageKey\":\"theme\""));
            assert_eq!(use_theme().theme(), Some("system".to_string()));
            assert_eq!(mem.preference.listener_count(), 1);
            assert_eq!(mem.storage.listener_count(), 1);
        });
    }

    #[test]
    fn test_nested_provider_is_passthrough() {
        let owner = Owner::new();
        owner.with(|| {
            let outer = MemoryHost::new();
            provide_theme(ThemeConfig::new().with_default_theme("dark"), outer.host()).unwrap();

            let child = Owner::new();
            child.with(|| {
                let inner = MemoryHost::new();
                let nested = provide_theme(
                    ThemeConfig::new()
                        .with_default_theme("light")
                        .with_attribute(Attribute::Class),
                    inner.host(),
                );
                assert!(nested.is_none());
                assert_eq!(inner.document.mutation_count(), 0);
                assert_eq!(inner.preference.listener_count(), 0);

                let ctx = use_theme();
                assert_eq!(ctx.theme(), Some("dark".to_string()));
                assert_eq!(ctx.resolved_theme(), Some("dark".to_string()));
            });
        });
    }

    #[test]
    fn test_events_flow_into_context() {
        let owner = Owner::new();
        owner.with(|| {
            let mem = MemoryHost::new();
            let ctx = provide_theme(ThemeConfig::new(), mem.host()).unwrap().context;

            mem.preference.set(Some(SystemTheme::Dark));
            assert_eq!(ctx.system_theme(), Some(SystemTheme::Dark));
            assert_eq!(ctx.resolved_theme(), Some("dark".to_string()));
            assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));

            mem.storage.external_change(StorageChange::set("theme", "light"));
            assert_eq!(ctx.theme(), Some("light".to_string()));
            assert_eq!(mem.document.attribute("data-theme"), Some("light".to_string()));
        });
    }

    #[test]
    fn test_disposing_owner_unsubscribes() {
        let mem = MemoryHost::new();
        let owner = Owner::new();
        owner.with(|| {
            provide_theme(ThemeConfig::new(), mem.host()).unwrap();
        });
        assert_eq!(mem.storage.listener_count(), 1);

        owner.cleanup();
        assert_eq!(mem.storage.listener_count(), 0);
        assert_eq!(mem.preference.listener_count(), 0);
    }
}
