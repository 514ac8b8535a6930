pub mod csp;
pub mod error;
pub mod logging;
pub mod theme;

pub use error::ThemeError;
pub use theme::{use_theme, ThemeConfig, ThemeContext, ThemeProvider};
