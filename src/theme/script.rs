//! First-paint bootstrap. An inline script built from the serialized config
//! themes the root element before the wasm bundle has loaded. [`run`] is the
//! same procedure against a [`Host`], for hosts that cannot execute the
//! inline script.

use leptos::prelude::*;
use tracing::{debug, error};

use crate::error::ThemeError;

use super::apply::apply_theme;
use super::config::ThemeConfig;
use super::host::Host;

/// Self-contained bootstrap function; called with the config object.
pub const BOOTSTRAP_JS: &str = include_str!("bootstrap.js");

/// JSON payload the bootstrap is fed. Excludes the nonce and the transition
/// setting.
pub fn serialize(config: &ThemeConfig) -> Result<String, ThemeError> {
    config.to_json()
}

/// Script body invoking [`BOOTSTRAP_JS`] on `payload`. `<` is escaped so the
/// payload cannot close the surrounding `<script>` element.
pub fn inline_source(payload: &str) -> String {
    format!(
        "{}({});",
        BOOTSTRAP_JS.trim_end(),
        payload.replace('<', "\\u003c")
    )
}

/// Apply the forced theme, else the persisted one, else the default.
/// Errors are logged, never propagated; the page just renders unthemed.
pub fn run(config: &ThemeConfig, host: &Host) {
    if let Err(e) = bootstrap(config, host) {
        error!("Theme bootstrap failed: {}", e);
    }
}

/// Parse a payload produced by [`serialize`] and run it.
pub fn run_serialized(payload: &str, host: &Host) {
    match ThemeConfig::from_json(payload) {
        Ok(config) => run(&config, host),
        Err(e) => error!("Theme bootstrap failed: {}", e),
    }
}

fn bootstrap(config: &ThemeConfig, host: &Host) -> Result<(), ThemeError> {
    if let Some(forced) = &config.forced_theme {
        debug!("Bootstrapping forced theme {}", forced);
        return apply_theme(config, Some(forced), host);
    }

    let name = host
        .storage
        .get_item(&config.storage_key)?
        .unwrap_or_else(|| config.default_theme().to_string());
    debug!("Bootstrapping theme {}", name);
    apply_theme(config, Some(&name), host)
}

/// Executable inline bootstrap. Server-rendered or prerendered pages run it
/// while parsing, before first paint.
#[component]
pub fn ThemeScript(
    /// Output of [`serialize`]
    #[prop(into)]
    payload: String,
    /// CSP nonce for the inline script
    nonce: Option<String>,
) -> impl IntoView {
    view! { <script nonce=nonce inner_html=inline_source(&payload)></script> }
}
