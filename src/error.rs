use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Invalid attribute '{0}': expected \"class\" or a \"data-*\" name")]
    InvalidAttribute(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No browser window available")]
    NoWindow,
}

impl From<ThemeError> for String {
    fn from(err: ThemeError) -> Self {
        err.to_string()
    }
}

impl From<serde_json::Error> for ThemeError {
    fn from(err: serde_json::Error) -> Self {
        ThemeError::Config(err.to_string())
    }
}
