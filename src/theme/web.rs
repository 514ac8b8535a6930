//! `web-sys` host: `localStorage`, `matchMedia` and `document.documentElement`.

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, MediaQueryList, MediaQueryListEvent, StorageEvent, Window};

use crate::error::ThemeError;

use super::host::{
    ColorSchemePreference, Host, StorageChange, Subscription, SystemTheme, ThemeDocument,
    ThemeStorage, TransitionGuard, PREFERS_DARK_QUERY,
};

const DISABLE_TRANSITIONS_CSS: &str = "*,*::before,*::after{-webkit-transition:none!important;-moz-transition:none!important;-o-transition:none!important;-ms-transition:none!important;transition:none!important}";

fn js_err(context: &str, err: JsValue) -> String {
    format!("{}: {}", context, err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Host backed by the current window.
pub fn browser_host() -> Result<Host, ThemeError> {
    let window = web_sys::window().ok_or(ThemeError::NoWindow)?;
    let root = window
        .document()
        .and_then(|doc| doc.document_element())
        .ok_or_else(|| ThemeError::Dom("document has no root element".to_string()))?;

    Ok(Host::new(
        Rc::new(WebStorage {
            window: window.clone(),
        }),
        Rc::new(WebPreference {
            window: window.clone(),
        }),
        Rc::new(WebDocument { window, root }),
    ))
}

pub struct WebStorage {
    window: Window,
}

impl WebStorage {
    fn storage(&self) -> Result<web_sys::Storage, ThemeError> {
        self.window
            .local_storage()
            .map_err(|e| ThemeError::Storage(js_err("localStorage unavailable", e)))?
            .ok_or_else(|| ThemeError::Storage("localStorage unavailable".to_string()))
    }
}

impl ThemeStorage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ThemeError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| ThemeError::Storage(js_err("getItem failed", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| ThemeError::Storage(js_err("setItem failed", e)))
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(StorageChange)>) -> Subscription {
        let closure = Closure::<dyn Fn(StorageEvent)>::new(move |event: StorageEvent| {
            on_change(StorageChange {
                key: event.key(),
                new_value: event.new_value(),
            });
        });

        if let Err(e) = self
            .window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
        {
            warn!("{}", js_err("Failed to listen for storage events", e));
            return Subscription::detached();
        }

        let window = self.window.clone();
        Subscription::new(move || {
            let _ = window
                .remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
        })
    }
}

pub struct WebPreference {
    window: Window,
}

impl WebPreference {
    fn media(&self) -> Option<MediaQueryList> {
        self.window.match_media(PREFERS_DARK_QUERY).ok().flatten()
    }
}

impl ColorSchemePreference for WebPreference {
    fn current(&self) -> Option<SystemTheme> {
        self.media()
            .map(|media| SystemTheme::from_prefers_dark(media.matches()))
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(SystemTheme)>) -> Subscription {
        let Some(media) = self.media() else {
            return Subscription::detached();
        };

        let closure = Closure::<dyn Fn(MediaQueryListEvent)>::new(move |event: MediaQueryListEvent| {
            on_change(SystemTheme::from_prefers_dark(event.matches()));
        });

        if let Err(e) =
            media.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            warn!("{}", js_err("Failed to listen for color-scheme changes", e));
            return Subscription::detached();
        }

        Subscription::new(move || {
            let _ = media
                .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        })
    }
}

pub struct WebDocument {
    window: Window,
    root: Element,
}

impl ThemeDocument for WebDocument {
    fn remove_classes(&self, classes: &[String]) -> Result<(), ThemeError> {
        let list = self.root.class_list();
        for class in classes {
            list.remove_1(class)
                .map_err(|e| ThemeError::Dom(js_err("classList.remove failed", e)))?;
        }
        Ok(())
    }

    fn add_class(&self, class: &str) -> Result<(), ThemeError> {
        self.root
            .class_list()
            .add_1(class)
            .map_err(|e| ThemeError::Dom(js_err("classList.add failed", e)))
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), ThemeError> {
        self.root
            .set_attribute(name, value)
            .map_err(|e| ThemeError::Dom(js_err("setAttribute failed", e)))
    }

    fn remove_attribute(&self, name: &str) -> Result<(), ThemeError> {
        self.root
            .remove_attribute(name)
            .map_err(|e| ThemeError::Dom(js_err("removeAttribute failed", e)))
    }

    fn set_color_scheme(&self, scheme: Option<&str>) -> Result<(), ThemeError> {
        let Some(root) = self.root.dyn_ref::<HtmlElement>() else {
            return Ok(());
        };
        let style = root.style();
        match scheme {
            Some(scheme) => style.set_property("color-scheme", scheme),
            None => style.remove_property("color-scheme").map(|_| ()),
        }
        .map_err(|e| ThemeError::Dom(js_err("color-scheme update failed", e)))
    }

    /// Inserts a style rule disabling transitions. The guard forces a restyle
    /// and removes the rule on the next macrotask.
    fn suppress_transitions(&self) -> Result<TransitionGuard, ThemeError> {
        let document = self
            .window
            .document()
            .ok_or_else(|| ThemeError::Dom("no document".to_string()))?;
        let head = document
            .head()
            .ok_or_else(|| ThemeError::Dom("document has no <head>".to_string()))?;
        let css = document
            .create_element("style")
            .map_err(|e| ThemeError::Dom(js_err("createElement failed", e)))?;
        css.set_text_content(Some(DISABLE_TRANSITIONS_CSS));
        head.append_child(&css)
            .map_err(|e| ThemeError::Dom(js_err("appendChild failed", e)))?;

        let window = self.window.clone();
        Ok(TransitionGuard::new(move || {
            if let Some(body) = document.body() {
                let _ = window.get_computed_style(&body);
            }
            // Already detached is fine.
            Timeout::new(1, move || {
                if let Some(parent) = css.parent_node() {
                    let _ = parent.remove_child(&css);
                }
            })
            .forget();
        }))
    }
}
