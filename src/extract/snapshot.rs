// src/extract/snapshot.rs
// =============================================================================
// The structured page snapshot.
//
// A PageSnapshot is built once per matched page and never changed afterwards.
// Its serde layout is the on-disk JSON format, so field names are fixed:
//   url, title, headings, main_text_snippet, json_ld, links
// =============================================================================

use std::collections::BTreeMap;

use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::links::{Anchor, SnapshotLink};
use super::selector;
use super::text::{squash_whitespace, truncate_chars};

/// Longest main-text snippet kept in a snapshot, in characters.
pub const SNIPPET_MAX_CHARS: usize = 1000;

pub const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    /// "h1".."h6" -> heading texts in document order. All six keys are always present.
    pub headings: BTreeMap<String, Vec<String>>,
    pub main_text_snippet: String,
    #[serde(rename = "json_ld")]
    pub structured_data: Vec<Value>,
    pub links: Vec<SnapshotLink>,
}

impl PageSnapshot {
    pub fn heading_count(&self) -> usize {
        self.headings.values().map(Vec::len).sum()
    }
}

/// A `<script type="application/ld+json">` block that isn't valid JSON.
#[derive(Debug, Error)]
#[error("malformed JSON-LD block: {0}")]
pub struct ParseError(#[from] serde_json::Error);

// Builds the snapshot from an already parsed document.
//
// `fragments` are the visible text fragments and `anchors` the resolved
// links; the caller computed both for the keyword check and link discovery,
// so they're passed in rather than derived again.
pub fn build_snapshot(
    document: &Html,
    url: &str,
    fragments: &[String],
    anchors: &[Anchor],
) -> PageSnapshot {
    PageSnapshot {
        url: url.to_string(),
        title: title(document),
        headings: headings(document),
        main_text_snippet: snippet(&fragments.join(" ")),
        structured_data: structured_data(document, url),
        links: anchors
            .iter()
            .map(|anchor| SnapshotLink {
                text: anchor.text.clone(),
                href: anchor.href(),
            })
            .collect(),
    }
}

pub fn title(document: &Html) -> String {
    document
        .select(&selector("title"))
        .next()
        .map(|el| squash_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

pub fn headings(document: &Html) -> BTreeMap<String, Vec<String>> {
    HEADING_LEVELS
        .iter()
        .map(|level| {
            let texts = document
                .select(&selector(level))
                .map(|el| squash_whitespace(&el.text().collect::<String>()))
                .collect();
            (level.to_string(), texts)
        })
        .collect()
}

// Truncates to SNIPPET_MAX_CHARS, marking the cut with "..."
pub fn snippet(text: &str) -> String {
    match truncate_chars(text, SNIPPET_MAX_CHARS) {
        (cut, true) => format!("{cut}..."),
        (whole, false) => whole.to_string(),
    }
}

// Collects every JSON-LD object on the page. A block holding an array
// contributes each element; a malformed block is skipped.
pub fn structured_data(document: &Html, url: &str) -> Vec<Value> {
    let mut objects = Vec::new();

    for script in document.select(&selector(r#"script[type="application/ld+json"]"#)) {
        let raw = script.text().collect::<String>();
        match parse_structured_block(&raw) {
            Ok(values) => objects.extend(values),
            Err(e) => tracing::debug!(url = %url, error = %e, "Skipping structured data block"),
        }
    }

    objects
}

fn parse_structured_block(raw: &str) -> Result<Vec<Value>, ParseError> {
    match serde_json::from_str(raw.trim())? {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}
