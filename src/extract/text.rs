// src/extract/text.rs
// =============================================================================
// Visible text and keyword matching.
//
// "Visible" means text nodes that don't live under style/script/head/meta
// (and friends). Comments are separate node kinds in scraper's tree, so they
// never show up as text in the first place.
// =============================================================================

use std::collections::BTreeSet;

use scraper::{Html, Node};

// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["style", "script", "head", "meta", "noscript", "template"];

// Returns the trimmed, non-empty visible text fragments in document order.
pub fn visible_fragments(document: &Html) -> Vec<String> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                    .unwrap_or(false)
            })
        })
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Visible text joined with single spaces.
pub fn visible_text(document: &Html) -> String {
    visible_fragments(document).join(" ")
}

// Returns the configured terms found in `text`, in the set's order.
//
// `terms` are expected to be lower-cased already (CrawlConfig does that).
pub fn matched_terms(text: &str, terms: &BTreeSet<String>) -> Vec<String> {
    let haystack = text.to_lowercase();
    terms
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .cloned()
        .collect()
}

// Cuts `text` to at most `max_chars` characters (not bytes).
// Returns the cut text and whether anything was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
