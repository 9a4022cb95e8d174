//! Link candidate extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::app::same_site;
use crate::models::LinkCandidate;
use crate::utils::selector_or_empty;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector_or_empty("a[href]", "link extraction"));

static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector_or_empty("base[href]", "base href lookup"));

static ONCLICK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector_or_empty("[onclick]", "onclick link extraction"));

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector_or_empty("img[alt]", "link image alt text"));

/// Quoted target of `location = '...'`, `location.href = '...'` or `window.open('...')`.
static ONCLICK_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:location(?:\.href)?\s*=|window\.open\s*\()\s*['"]([^'"]+)['"]"#)
        .unwrap_or_else(|e| panic!("Invalid onclick URL regex: {e}"))
});

const SKIPPED_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Extracts same-site link candidates from a page.
///
/// Each `a[href]` is trimmed, resolved against `base_url` (or the document's
/// `<base href>`), stripped of its fragment, and deduplicated in first-seen
/// order. Fragment-only, `mailto:`, `tel:`, `javascript:` and non-http(s)
/// links are skipped, as are links to other sites. When no anchor qualifies,
/// `onclick` navigation handlers are scanned instead.
pub fn extract_links(html: &str, base_url: &str) -> Vec<LinkCandidate> {
    let Ok(page_url) = Url::parse(base_url) else {
        log::debug!("Cannot extract links: invalid base URL {base_url}");
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let resolve_base = document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone());

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(resolved) = resolve_candidate(href, &resolve_base, &page_url) {
            if seen.insert(resolved.clone()) {
                candidates.push(LinkCandidate::new(resolved, anchor_text(anchor)));
            }
        }
    }

    if candidates.is_empty() {
        for element in document.select(&ONCLICK_SELECTOR) {
            let Some(handler) = element.value().attr("onclick") else {
                continue;
            };
            for captures in ONCLICK_URL_RE.captures_iter(handler) {
                if let Some(resolved) = resolve_candidate(&captures[1], &resolve_base, &page_url)
                {
                    if seen.insert(resolved.clone()) {
                        candidates.push(LinkCandidate::new(resolved, anchor_text(element)));
                    }
                }
            }
        }
    }

    candidates
}

/// Resolves one raw href into an absolute, fragment-free, same-site URL.
fn resolve_candidate(href: &str, resolve_base: &Url, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return None;
    }

    let mut resolved = resolve_base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") || !same_site(&resolved, page_url) {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Visible text of an element, whitespace-collapsed, with attribute fallbacks.
fn anchor_text(element: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&element.text().collect::<String>());
    if !text.is_empty() {
        return text;
    }
    ["title", "aria-label"]
        .iter()
        .find_map(|attr| {
            element
                .value()
                .attr(attr)
                .filter(|value| !value.trim().is_empty())
        })
        .or_else(|| {
            element
                .select(&IMG_SELECTOR)
                .next()
                .and_then(|img| img.value().attr("alt"))
        })
        .map(collapse_whitespace)
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
