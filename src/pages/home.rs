use leptos::prelude::*;

use crate::components::theme_status::ThemeStatus;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="page home-page">
            <h2>"Welcome to themeshift"</h2>
            <p class="page-description">
                "The page was themed before it rendered and stays in sync with your OS and other tabs."
            </p>

            <ThemeStatus />

            <div class="how-it-works">
                <h3>"How It Works"</h3>
                <div class="steps">
                    <div class="step">
                        <span class="step-number">"1"</span>
                        <div class="step-content">
                            <strong>"Bootstrap"</strong>
                            <p>"An inline script in the page head applies the saved theme to the root element before the app bundle loads"</p>
                        </div>
                    </div>
                    <div class="step">
                        <span class="step-number">"2"</span>
                        <div class="step-content">
                            <strong>"Follow"</strong>
                            <p>"With \"System\" selected, OS color-scheme changes apply immediately"</p>
                        </div>
                    </div>
                    <div class="step">
                        <span class="step-number">"3"</span>
                        <div class="step-content">
                            <strong>"Sync"</strong>
                            <p>"Changing the theme in one tab updates every other open tab"</p>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
