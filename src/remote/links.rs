//! Anchor link extraction from listing pages

use std::sync::LazyLock;

use regex::Regex;

/// Matches the `href` attribute of an `<a>` tag, single- or double-quoted
#[allow(clippy::unwrap_used)]
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Every anchor `href` in `html`, in document order, with empty and
/// fragment-only targets dropped
pub fn extract_hrefs(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .collect()
}
