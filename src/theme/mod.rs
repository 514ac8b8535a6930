//! Light/dark/system theme switching for the document root.
//!
//! The outermost [`ThemeProvider`] owns a [`ThemeStore`] and renders the
//! inline bootstrap script built from its serialized config. The store keeps
//! the root element's class list or `data-*` attributes and `color-scheme` in
//! sync with the selected, forced and system themes.

pub mod apply;
pub mod config;
pub mod context;
pub mod host;
pub mod memory;
pub mod provider;
pub mod script;
pub mod store;
pub mod web;

pub use config::{Attribute, AttributeTargets, ThemeConfig};
pub use context::{use_theme, ThemeContext, ThemeHandle};
pub use host::{Host, StorageChange, SystemTheme};
pub use provider::{provide_theme, ThemeMount, ThemeProvider};
pub use store::{ThemeSnapshot, ThemeStore, ThemeUpdate};
