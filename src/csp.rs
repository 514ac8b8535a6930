//! Per-request nonce and Content-Security-Policy header for pages that embed
//! the inline theme config block.

use base64::prelude::*;
use uuid::Uuid;

pub const NONCE_HEADER: &str = "x-nonce";
pub const CSP_HEADER: &str = "Content-Security-Policy";
/// `<meta name="csp-nonce" content="...">` carries the nonce to the client.
pub const NONCE_META: &str = "csp-nonce";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Base64 of a random v4 UUID string.
    pub fn generate() -> Self {
        Self(BASE64_STANDARD.encode(Uuid::new_v4().to_string()))
    }

    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    directives: Vec<(String, Vec<String>)>,
}

impl ContentSecurityPolicy {
    pub fn empty() -> Self {
        Self {
            directives: Vec::new(),
        }
    }

    /// Same-origin policy that allows inline scripts only with `nonce`.
    /// Third-party hosts for `connect-src` or `frame-src` are added with
    /// [`ContentSecurityPolicy::directive`].
    pub fn with_nonce(nonce: &Nonce) -> Self {
        let script_nonce = format!("'nonce-{}'", nonce.as_str());
        Self::empty()
            .directive("default-src", ["'self'"])
            .directive(
                "script-src",
                ["'self'", "blob:", script_nonce.as_str(), "'unsafe-eval'"],
            )
            .directive("style-src", ["'self'", "'unsafe-inline'"])
            .directive("img-src", ["'self'", "blob:", "data:"])
            .directive("connect-src", ["'self'", "data:"])
            .directive("font-src", ["'self'"])
            .directive("object-src", ["'none'"])
            .directive("base-uri", ["'self'"])
            .directive("form-action", ["'self'"])
            .directive("frame-src", ["'self'"])
            .directive("frame-ancestors", ["'none'"])
            .directive("worker-src", ["'self'", "blob:"])
            .directive("upgrade-insecure-requests", [] as [&str; 0])
    }

    /// Add a directive, replacing any existing one with the same name.
    pub fn directive<I, S>(mut self, name: &str, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<String> = sources
            .into_iter()
            .flat_map(|s| {
                s.as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let name = name.trim().to_string();
        match self.directives.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = sources,
            None => self.directives.push((name, sources)),
        }
        self
    }

    pub fn sources(&self, name: &str) -> Option<&[String]> {
        self.directives
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_slice())
    }

    /// Single-line header value: `name src src; name src; flag;`
    pub fn header_value(&self) -> String {
        self.directives
            .iter()
            .map(|(name, sources)| {
                if sources.is_empty() {
                    format!("{};", name)
                } else {
                    format!("{} {};", name, sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Headers to set on both the forwarded request and the response.
pub fn response_headers(nonce: &Nonce) -> [(&'static str, String); 2] {
    [
        (NONCE_HEADER, nonce.as_str().to_string()),
        (
            CSP_HEADER,
            ContentSecurityPolicy::with_nonce(nonce).header_value(),
        ),
    ]
}

/// Nonce the server put in the page's `<meta name="csp-nonce">`, if any.
pub fn document_nonce() -> Option<String> {
    let document = web_sys::window()?.document()?;
    document
        .query_selector(&format!("meta[name=\"{}\"]", NONCE_META))
        .ok()
        .flatten()?
        .get_attribute("content")
        .filter(|nonce| !nonce.is_empty())
}
