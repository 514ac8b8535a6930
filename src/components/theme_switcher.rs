use leptos::prelude::*;

use themeshift::theme::{use_theme, ThemeUpdate};

/// Human-readable label for a theme name.
pub fn theme_label(theme: &str) -> String {
    match theme {
        "system" => "System".to_string(),
        "light" => "Light".to_string(),
        "dark" => "Dark".to_string(),
        other => other
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// `<select>` over the available themes, bound to the provider.
#[component]
pub fn ThemeSwitcher(
    /// Element id, also used for the label
    id: &'static str,
) -> impl IntoView {
    let theme = use_theme();
    let disabled = move || theme.forced_theme().is_some();

    view! {
        <div class="form-group theme-switcher">
            <label for=id>"Theme"</label>
            <select
                id=id
                class="input"
                disabled=disabled
                on:change=move |ev| {
                    theme.set_theme(event_target_value(&ev));
                }
            >
                {move || {
                    let current = theme.theme().unwrap_or_default();
                    theme
                        .themes()
                        .into_iter()
                        .map(|name| {
                            let selected = name == current;
                            let label = theme_label(&name);
                            view! {
                                <option value=name selected=selected>{label}</option>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </select>
            <button
                class="btn btn-secondary"
                disabled=disabled
                on:click=move |_| {
                    theme.set_theme(ThemeUpdate::map(|current| {
                        if current == "dark" { "light".to_string() } else { "dark".to_string() }
                    }));
                }
            >
                "Toggle light/dark"
            </button>
        </div>
    }
}
