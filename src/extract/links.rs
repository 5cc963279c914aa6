// src/extract/links.rs
// =============================================================================
// Anchor extraction and file-type matching.
//
// Every <a href> is resolved against the page's own URL and kept in document
// order. Duplicates stay: dedup happens later, when the frontier claims a URL.
// An href that doesn't resolve is still kept (as written) for the snapshot,
// it just never becomes a URL to follow.
// =============================================================================

use std::collections::BTreeSet;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{selector, text::squash_whitespace};

/// One anchor as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub text: String,
    pub href: String,
}

/// One `<a href>` of a page.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// The resolved URL, or None when the href couldn't be resolved
    pub url: Option<Url>,
    pub text: String,
    raw_href: String,
}

impl Anchor {
    /// The absolute URL when there is one, the href as written otherwise.
    pub fn href(&self) -> String {
        match &self.url {
            Some(url) => url.to_string(),
            None => self.raw_href.clone(),
        }
    }
}

pub fn anchors(document: &Html, base: &Url) -> Vec<Anchor> {
    let a_tags = selector("a[href]");

    document
        .select(&a_tags)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                url: resolve_url(base, href),
                text: element_text(element),
                raw_href: href.trim().to_string(),
            })
        })
        .collect()
}

// Resolves a possibly-relative href to an absolute URL
//
// Examples (base = "https://example.com/page"):
//   "/docs"              -> https://example.com/docs
//   "../other"           -> https://example.com/other
//   "https://other.com"  -> https://other.com/
//   "http://[broken"     -> None
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    match Url::parse(href) {
        Ok(url) => Some(url),
        // Relative URL, join it with the page's URL
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(href).ok(),
        Err(_) => None,
    }
}

/// Only http(s) links are worth fetching; mailto:, javascript: etc. are not.
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

// The frontier key for a URL: same URL with the fragment dropped,
// so "/page#a" and "/page#b" are one visit.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

// True if the URL's path ends with one of the (lower-cased) suffixes.
pub fn matches_file_type(url: &Url, file_types: &BTreeSet<String>) -> bool {
    if !is_crawlable(url) {
        return false;
    }
    let path = url.path().to_lowercase();
    file_types.iter().any(|suffix| path.ends_with(suffix.as_str()))
}

fn element_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<String>())
}
