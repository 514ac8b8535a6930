use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

pub const SYSTEM: &str = "system";
pub const LIGHT: &str = "light";
pub const DARK: &str = "dark";

/// Themes the browser can render natively through `color-scheme`.
pub const COLOR_SCHEMES: [&str; 2] = [LIGHT, DARK];

/// A single place on the root element where the theme token is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Attribute {
    /// The root element's class list.
    Class,
    /// A `data-*` attribute, stored with its full name.
    Data(String),
}

impl Attribute {
    pub fn parse(name: &str) -> Result<Self, ThemeError> {
        if name == "class" {
            Ok(Attribute::Class)
        } else if name.starts_with("data-") && name.len() > "data-".len() {
            Ok(Attribute::Data(name.to_string()))
        } else {
            Err(ThemeError::InvalidAttribute(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Attribute::Class => "class",
            Attribute::Data(name) => name,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Attribute {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Attribute::parse(&value)
    }
}

impl TryFrom<&str> for Attribute {
    type Error = ThemeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Attribute::parse(value)
    }
}

impl From<Attribute> for String {
    fn from(attr: Attribute) -> Self {
        match attr {
            Attribute::Class => "class".to_string(),
            Attribute::Data(name) => name,
        }
    }
}

/// Ordered, non-empty set of attribute targets. A single attribute is just a
/// list of one; every entry is handled the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributeTargets(Vec<Attribute>);

impl AttributeTargets {
    pub fn new(targets: Vec<Attribute>) -> Result<Self, ThemeError> {
        if targets.is_empty() {
            return Err(ThemeError::Config(
                "at least one attribute target is required".to_string(),
            ));
        }
        let mut unique: Vec<Attribute> = Vec::with_capacity(targets.len());
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        Ok(Self(unique))
    }

    /// Parse a list of names such as `["class", "data-mode"]`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ThemeError> {
        let targets = names
            .iter()
            .map(|n| Attribute::parse(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(targets)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}

impl Default for AttributeTargets {
    fn default() -> Self {
        Self(vec![Attribute::Data("data-theme".to_string())])
    }
}

impl From<Attribute> for AttributeTargets {
    fn from(attr: Attribute) -> Self {
        Self(vec![attr])
    }
}

impl TryFrom<Vec<Attribute>> for AttributeTargets {
    type Error = ThemeError;

    fn try_from(value: Vec<Attribute>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttributeTargets> for Vec<Attribute> {
    fn from(targets: AttributeTargets) -> Self {
        targets.0
    }
}

/// Provider configuration. Built once per provider and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub storage_key: String,
    pub themes: Vec<String>,
    /// `None` means "derive from `enable_system`", see [`ThemeConfig::default_theme`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_theme: Option<String>,
    pub attribute: AttributeTargets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<BTreeMap<String, String>>,
    pub enable_system: bool,
    pub enable_color_scheme: bool,
    // The first-paint script never suppresses transitions and never needs the nonce.
    #[serde(skip)]
    pub disable_transition_on_change: bool,
    #[serde(skip)]
    pub nonce: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            themes: vec![LIGHT.to_string(), DARK.to_string()],
            default_theme: None,
            forced_theme: None,
            attribute: AttributeTargets::default(),
            value: None,
            enable_system: true,
            enable_color_scheme: true,
            disable_transition_on_change: false,
            nonce: None,
        }
    }
}

impl ThemeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for theme in themes {
            let theme = theme.into();
            if !unique.contains(&theme) {
                unique.push(theme);
            }
        }
        self.themes = unique;
        self
    }

    pub fn with_default_theme(mut self, theme: impl Into<String>) -> Self {
        self.default_theme = Some(theme.into());
        self
    }

    pub fn with_forced_theme(mut self, theme: Option<String>) -> Self {
        self.forced_theme = theme;
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<AttributeTargets>) -> Self {
        self.attribute = attribute.into();
        self
    }

    pub fn with_value<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.value = Some(
            mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_enable_system(mut self, enable: bool) -> Self {
        self.enable_system = enable;
        self
    }

    pub fn with_enable_color_scheme(mut self, enable: bool) -> Self {
        self.enable_color_scheme = enable;
        self
    }

    pub fn with_disable_transition_on_change(mut self, disable: bool) -> Self {
        self.disable_transition_on_change = disable;
        self
    }

    pub fn with_nonce(mut self, nonce: Option<String>) -> Self {
        self.nonce = nonce;
        self
    }

    /// The theme used when nothing is persisted: explicit default if given,
    /// otherwise `"system"` with system theming enabled and `"light"` without.
    pub fn default_theme(&self) -> &str {
        match &self.default_theme {
            Some(theme) => theme,
            None if self.enable_system => SYSTEM,
            None => LIGHT,
        }
    }

    /// `themes`, plus `"system"` when system theming is enabled.
    pub fn available_themes(&self) -> Vec<String> {
        let mut themes = self.themes.clone();
        if self.enable_system && !themes.iter().any(|t| t == SYSTEM) {
            themes.push(SYSTEM.to_string());
        }
        themes
    }

    /// DOM token for a resolved theme name. With a value mapping, names
    /// missing from the mapping have no token.
    pub fn token_for<'a>(&'a self, resolved: &'a str) -> Option<&'a str> {
        match &self.value {
            Some(mapping) => mapping.get(resolved).map(String::as_str),
            None => Some(resolved),
        }
    }

    /// Every class token this config can produce; all of them are cleared
    /// before a new one is added.
    pub fn registered_tokens(&self) -> Vec<String> {
        match &self.value {
            Some(mapping) => mapping.values().cloned().collect(),
            None => self.themes.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ThemeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }
}
