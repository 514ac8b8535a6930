use tracing::{debug, warn};

use crate::error::ThemeError;

use super::config::{Attribute, ThemeConfig, COLOR_SCHEMES, SYSTEM};
use super::host::Host;

/// Resolve `"system"` against the live OS preference. Without a preference
/// API the name is returned unchanged.
pub fn resolve_name(config: &ThemeConfig, name: &str, host: &Host) -> String {
    if name == SYSTEM && config.enable_system {
        if let Some(system) = host.preference.current() {
            return system.as_str().to_string();
        }
    }
    name.to_string()
}

/// Value for the root's `color-scheme` property, or `None` to clear it.
pub fn color_scheme_for<'a>(config: &'a ThemeConfig, resolved: &'a str) -> Option<&'a str> {
    if COLOR_SCHEMES.contains(&resolved) {
        return Some(resolved);
    }
    let fallback = config.default_theme();
    COLOR_SCHEMES.contains(&fallback).then_some(fallback)
}

/// Apply a theme to the document root.
///
/// - `class`: every registered token is removed, then the new token is added
/// - `data-*`: the attribute is set to the token, or removed if there is none
/// - `color-scheme` follows the resolved name when `enable_color_scheme` is on
///
/// Does nothing for `None`. Applying the same theme twice leaves the same DOM.
pub fn apply_theme(config: &ThemeConfig, name: Option<&str>, host: &Host) -> Result<(), ThemeError> {
    let Some(name) = name else {
        return Ok(());
    };

    let resolved = resolve_name(config, name, host);
    let token = config.token_for(&resolved);
    debug!("Applying theme {} (resolved {}, token {:?})", name, resolved, token);

    // Restored when dropped at the end of this function, after the mutation.
    let _guard = if config.disable_transition_on_change {
        match host.document.suppress_transitions() {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!("Applying theme without suppressing transitions: {}", e);
                None
            }
        }
    } else {
        None
    };

    let doc = &host.document;
    for target in config.attribute.iter() {
        match target {
            Attribute::Class => {
                doc.remove_classes(&config.registered_tokens())?;
                if let Some(token) = token {
                    doc.add_class(token)?;
                }
            }
            Attribute::Data(attr) => match token {
                Some(token) => doc.set_attribute(attr, token)?,
                None => doc.remove_attribute(attr)?,
            },
        }
    }

    if config.enable_color_scheme {
        doc.set_color_scheme(color_scheme_for(config, &resolved))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::config::AttributeTargets;
    use crate::theme::host::{SystemTheme, ThemeDocument};
    use crate::theme::memory::MemoryHost;

    #[test]
    fn test_data_attribute_replaces_previous() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new();

        apply_theme(&config, Some("light"), &mem.host()).unwrap();
        apply_theme(&config, Some("dark"), &mem.host()).unwrap();

        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
        assert_eq!(mem.document.color_scheme(), Some("dark".to_string()));
    }

    #[test]
    fn test_class_leaves_no_residue() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new().with_attribute(Attribute::Class);
        mem.document.add_class("keep-me").unwrap();

        apply_theme(&config, Some("light"), &mem.host()).unwrap();
        apply_theme(&config, Some("dark"), &mem.host()).unwrap();

        assert_eq!(mem.document.classes(), vec!["keep-me", "dark"]);
    }

    #[test]
    fn test_multiple_targets_applied_in_order() {
        let mem = MemoryHost::new();
        let targets = AttributeTargets::parse(&["class", "data-mode"]).unwrap();
        let config = ThemeConfig::new().with_attribute(targets);

        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        apply_theme(&config, Some("light"), &mem.host()).unwrap();

        assert_eq!(mem.document.classes(), vec!["light"]);
        assert_eq!(mem.document.attribute("data-mode"), Some("light".to_string()));
    }

    #[test]
    fn test_none_is_noop() {
        let mem = MemoryHost::new();
        apply_theme(&ThemeConfig::new(), None, &mem.host()).unwrap();
        assert_eq!(mem.document.attribute("data-theme"), None);
        assert_eq!(mem.document.color_scheme(), None);
    }

    #[test]
    fn test_system_resolves_to_live_preference() {
        let mem = MemoryHost::new();
        mem.preference.set(Some(SystemTheme::Dark));

        apply_theme(&ThemeConfig::new(), Some("system"), &mem.host()).unwrap();
        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_system_without_preference_api_is_literal() {
        let mem = MemoryHost::new();
        mem.preference.set(None);

        let config = ThemeConfig::new().with_enable_color_scheme(false);
        apply_theme(&config, Some("system"), &mem.host()).unwrap();
        assert_eq!(mem.document.attribute("data-theme"), Some("system".to_string()));
    }

    #[test]
    fn test_value_mapping_missing_entry_removes_attribute() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new().with_value([("dark", "dark-mode")]);

        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        assert_eq!(mem.document.attribute("data-theme"), Some("dark-mode".to_string()));

        apply_theme(&config, Some("light"), &mem.host()).unwrap();
        assert_eq!(mem.document.attribute("data-theme"), None);
    }

    #[test]
    fn test_value_mapping_class_clears_mapped_tokens() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new()
            .with_attribute(Attribute::Class)
            .with_value([("dark", "dark-mode")]);

        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        assert_eq!(mem.document.classes(), vec!["dark-mode"]);

        apply_theme(&config, Some("light"), &mem.host()).unwrap();
        assert!(mem.document.classes().is_empty());
    }

    #[test]
    fn test_color_scheme_fallback() {
        let config = ThemeConfig::new().with_themes(["pink", "light", "dark"]);
        // default is "system", not a color scheme
        assert_eq!(color_scheme_for(&config, "pink"), None);
        assert_eq!(color_scheme_for(&config, "dark"), Some("dark"));

        let config = config.with_default_theme("light");
        assert_eq!(color_scheme_for(&config, "pink"), Some("light"));
    }

    #[test]
    fn test_color_scheme_disabled() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new().with_enable_color_scheme(false);
        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        assert_eq!(mem.document.color_scheme(), None);
    }

    #[test]
    fn test_transitions_suppressed_only_during_mutation() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new().with_disable_transition_on_change(true);

        apply_theme(&config, Some("dark"), &mem.host()).unwrap();

        assert_eq!(mem.document.suppression_count(), 1);
        assert!(!mem.document.transitions_suppressed());
    }

    #[test]
    fn test_failed_suppression_still_applies() {
        let mem = MemoryHost::new();
        mem.document.set_head_missing(true);
        let config = ThemeConfig::new().with_disable_transition_on_change(true);

        apply_theme(&config, Some("dark"), &mem.host()).unwrap();

        assert_eq!(mem.document.attribute("data-theme"), Some("dark".to_string()));
        assert_eq!(mem.document.color_scheme(), Some("dark".to_string()));
        assert_eq!(mem.document.suppression_count(), 0);
    }

    #[test]
    fn test_idempotent() {
        let mem = MemoryHost::new();
        let config = ThemeConfig::new().with_attribute(Attribute::Class);
        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        let once = mem.document.classes();
        apply_theme(&config, Some("dark"), &mem.host()).unwrap();
        assert_eq!(mem.document.classes(), once);
    }
}
