use leptos::prelude::*;

use themeshift::theme::{use_theme, ThemeProvider};

use crate::app::PreviewTheme;
use crate::components::theme_status::ThemeStatus;
use crate::components::theme_switcher::{theme_label, ThemeSwitcher};

#[component]
pub fn AppearancePage() -> impl IntoView {
    let theme = use_theme();
    let forced = use_context::<PreviewTheme>().map(|p| p.0);
    let (preview, set_preview) = signal(String::from("high-contrast"));

    let start_preview = move |_| {
        if let Some(forced) = forced {
            forced.set(Some(preview.get()));
        }
    };
    let stop_preview = move |_| {
        if let Some(forced) = forced {
            forced.set(None);
        }
    };
    let previewing = move || forced.map(|f| f.get().is_some()).unwrap_or(false);

    view! {
        <div class="page appearance-page">
            <h2>"Appearance"</h2>

            <section class="settings-section">
                <h3>"Theme"</h3>
                <p class="section-description">
                    "Your choice is saved in this browser and shared with other tabs."
                </p>
                <ThemeSwitcher id="appearance-theme" />
            </section>

            <section class="settings-section">
                <h3>"Preview"</h3>
                <p class="section-description">
                    "Force a theme without changing your saved choice."
                </p>
                <div class="input-row">
                    <select
                        class="input"
                        on:change=move |ev| set_preview.set(event_target_value(&ev))
                    >
                        {move || {
                            theme
                                .themes()
                                .into_iter()
                                .filter(|t| t != "system")
                                .map(|name| {
                                    let selected = name == preview.get_untracked();
                                    let label = theme_label(&name);
                                    view! { <option value=name selected=selected>{label}</option> }
                                })
                                .collect::<Vec<_>>()
                        }}
                    </select>
                    <Show
                        when=previewing
                        fallback=move || view! {
                            <button class="btn btn-save" on:click=start_preview>"Preview"</button>
                        }
                    >
                        <button class="btn btn-secondary" on:click=stop_preview>"Stop preview"</button>
                    </Show>
                </div>
            </section>

            // Inner providers are passthroughs; this one's settings are ignored.
            <ThemeProvider default_theme="light" storage_key="ignored">
                <section class="settings-section">
                    <h3>"Current state"</h3>
                    <ThemeStatus />
                </section>
            </ThemeProvider>
        </div>
    }
}
