//! `tracing` output for the browser: formatted events go to the devtools
//! console through `tracing-web`, one `console.*` call per event.

use tracing::Subscriber;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_web::MakeWebConsoleWriter;

/// Directive string used when `filter` is `None` or invalid.
pub const DEFAULT_FILTER: &str = "info";

pub fn env_filter(filter: Option<&str>) -> EnvFilter {
    filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Registry with `filter` and a fmt layer writing to the browser console.
/// There is no wall clock in wasm, so events carry no timestamp.
pub fn subscriber(filter: Option<&str>) -> impl Subscriber + Send + Sync {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(fmt_layer)
}

/// Install the global subscriber.
pub fn init(filter: Option<&str>) {
    if let Err(e) = subscriber(filter).try_init() {
        web_sys::console::warn_1(&format!("Logging already initialized: {}", e).into());
    }
}
