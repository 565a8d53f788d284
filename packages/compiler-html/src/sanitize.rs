//! Allow-lists for everything user input can put into an attribute.
//!
//! Public output accepts only `http://`, `https://` and `data:image/` URLs and
//! `#rgb` / `#rrggbb` style hex colours. Anything else is dropped, never
//! rewritten into something "probably safe".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How much the renderer trusts the document it is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Editor preview of the author's own document
    Trusted,
    /// Public snapshot of untrusted content
    #[default]
    Public,
}

const PUBLIC_URL_PREFIXES: &[&str] = &["http://", "https://", "data:image/"];
const TRUSTED_SRC_PREFIXES: &[&str] = &["blob:"];
const TRUSTED_HREF_PREFIXES: &[&str] = &["mailto:"];

fn public_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{3,6}$").unwrap())
}

fn trusted_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(#[0-9a-fA-F]{3,8}|rgba?\(\s*[0-9.%,\s]+\)|[a-zA-Z]{3,20})$").unwrap()
    })
}

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap())
}

fn language_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_+\-]{1,32}$").unwrap())
}

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn starts_with_any(url: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Validated image source, or `None` when the URL must be dropped
pub fn safe_src(src: &str, mode: RenderMode) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.chars().any(char::is_control) {
        return None;
    }

    let allowed = starts_with_any(src, PUBLIC_URL_PREFIXES)
        || (mode == RenderMode::Trusted
            && (starts_with_any(src, TRUSTED_SRC_PREFIXES)
                || (src.starts_with('/') && !src.starts_with("//"))));

    if allowed {
        Some(src.to_string())
    } else {
        tracing::debug!(src, ?mode, "dropping image with disallowed source");
        None
    }
}

/// Validated link target, or `None` when the link must be dropped
///
/// Targets without a scheme are treated as hosts, not relative paths:
/// `example.com/a` becomes `https://example.com/a`.
pub fn safe_href(href: &str, mode: RenderMode) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.chars().any(char::is_control) {
        return None;
    }

    let href = if href.starts_with("//") {
        format!("https:{}", href)
    } else if scheme_re().is_match(href) {
        href.to_string()
    } else {
        format!("https://{}", href)
    };

    let allowed = starts_with_any(&href, PUBLIC_URL_PREFIXES)
        || (mode == RenderMode::Trusted && starts_with_any(&href, TRUSTED_HREF_PREFIXES));

    if allowed {
        Some(href)
    } else {
        tracing::debug!(href = %href, ?mode, "dropping link with disallowed scheme");
        None
    }
}

/// Validated CSS colour for colour marks
pub fn safe_color(color: &str, mode: RenderMode) -> Option<&str> {
    let color = color.trim();
    let re = match mode {
        RenderMode::Public => public_color_re(),
        RenderMode::Trusted => trusted_color_re(),
    };
    re.is_match(color).then_some(color)
}

/// Code block language usable as a class suffix
pub fn safe_language(language: &str) -> Option<&str> {
    let language = language.trim();
    language_re().is_match(language).then_some(language)
}
