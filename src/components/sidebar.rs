use leptos::prelude::*;

use crate::components::theme_switcher::ThemeSwitcher;

#[component]
pub fn Sidebar() -> impl IntoView {
    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1 class="sidebar-title">"themeshift"</h1>
                <p class="sidebar-subtitle">"Theme switching demo"</p>
            </div>
            <ul class="nav-list">
                <li class="nav-item">
                    <a href="/" class="nav-link">"Home"</a>
                </li>
                <li class="nav-item">
                    <a href="/appearance" class="nav-link">"Appearance"</a>
                </li>
            </ul>
            <div class="sidebar-footer">
                <ThemeSwitcher id="sidebar-theme" />
            </div>
        </nav>
    }
}
