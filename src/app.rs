use std::collections::BTreeMap;

use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::path;

use themeshift::csp;
use themeshift::theme::{Attribute, AttributeTargets, ThemeProvider};

use crate::components::sidebar::Sidebar;
use crate::pages::appearance::AppearancePage;
use crate::pages::home::HomePage;

/// Themes offered by the demo; `high-contrast` shows a custom value mapping.
pub const THEMES: [&str; 3] = ["light", "dark", "high-contrast"];

/// Theme forced by the preview controls on the appearance page.
#[derive(Clone, Copy)]
pub struct PreviewTheme(pub RwSignal<Option<String>>);

/// Class for stylesheets plus `data-theme` for scripts.
pub fn theme_attribute() -> AttributeTargets {
    AttributeTargets::new(vec![
        Attribute::Class,
        Attribute::Data("data-theme".to_string()),
    ])
    .unwrap_or_default()
}

pub fn theme_value() -> BTreeMap<String, String> {
    THEMES
        .iter()
        .map(|t| {
            let token = if *t == "high-contrast" { "hc" } else { *t };
            (t.to_string(), token.to_string())
        })
        .collect()
}

#[component]
pub fn App() -> impl IntoView {
    let forced = RwSignal::new(None::<String>);
    provide_context(PreviewTheme(forced));

    view! {
        <ThemeProvider
            themes=THEMES.iter().map(|t| t.to_string()).collect()
            attribute=theme_attribute()
            value=theme_value()
            forced_theme=Signal::derive(move || forced.get())
            disable_transition_on_change=true
            nonce=csp::document_nonce()
        >
            <Router>
                <div class="app-layout">
                    <Sidebar />
                    <main class="content">
                        <Routes fallback=|| view! { <p>"Page not found"</p> }>
                            <Route path=path!("/") view=HomePage />
                            <Route path=path!("/appearance") view=AppearancePage />
                        </Routes>
                    </main>
                </div>
            </Router>
        </ThemeProvider>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themeshift::theme::{script, ThemeConfig};

    #[test]
    fn test_index_html_bootstraps_app_config() {
        let config = ThemeConfig::new()
            .with_themes(THEMES)
            .with_attribute(theme_attribute())
            .with_value(theme_value());
        let payload = script::serialize(&config).unwrap();

        let index = include_str!("../index.html");
        assert!(index.contains(&script::inline_source(&payload)));
    }
}
