use leptos::prelude::*;

use themeshift::theme::use_theme;

#[component]
fn StatusRow(
    /// Row label, e.g. "Resolved"
    label: &'static str,
    /// Current value; `None` renders as a dash
    value: Signal<Option<String>>,
) -> impl IntoView {
    view! {
        <div class="status-row">
            <span class="status-name">{label}</span>
            <span class="status-value">
                {move || value.get().unwrap_or_else(|| "\u{2014}".to_string())}
            </span>
        </div>
    }
}

/// Live view of everything `use_theme` exposes.
#[component]
pub fn ThemeStatus() -> impl IntoView {
    let theme = use_theme();

    view! {
        <div class="theme-status">
            <StatusRow label="Selected" value=Signal::derive(move || theme.theme()) />
            <StatusRow label="Forced" value=Signal::derive(move || theme.forced_theme()) />
            <StatusRow label="Resolved" value=Signal::derive(move || theme.resolved_theme()) />
            <StatusRow
                label="System"
                value=Signal::derive(move || theme.system_theme().map(|s| s.to_string()))
            />
            <StatusRow
                label="Available"
                value=Signal::derive(move || Some(theme.themes().join(", ")))
            />
        </div>
    }
}
