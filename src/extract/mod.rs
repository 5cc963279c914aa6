// src/extract/mod.rs
// =============================================================================
// The document extractor.
//
// Submodules:
// - text: visible text and keyword matching
// - links: anchor resolution and file-type matching
// - snapshot: the PageSnapshot record and how it is built
// - page: metadata, tables and images for the inspect command
//
// Extractor::extract() parses a Document once and derives everything the
// worker needs from that single parse: the keyword verdict, the links to
// enqueue, the links to harvest and (on a match) the snapshot.
//
// scraper's Html isn't Send, so it never leaves this module: callers get
// plain owned data back and can hold it across .await points.
// =============================================================================

mod links;
mod page;
mod snapshot;
mod text;

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::config::CrawlConfig;
use crate::fetch::Document;

pub use links::{is_crawlable, matches_file_type, normalize, SnapshotLink};
pub use page::{PageMetadata, Table};
pub use snapshot::PageSnapshot;
pub use text::truncate_chars;

/// What one fetched page yields.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Configured search terms found in the visible text
    pub matched_terms: Vec<String>,
    /// True when no filter is configured or at least one term matched
    pub is_match: bool,
    /// Every anchor that resolved, in document order (duplicates kept)
    pub links: Vec<Url>,
    /// The subset of `links` whose path ends with a configured file type
    pub file_links: Vec<Url>,
    /// Only present when `is_match` is true
    pub snapshot: Option<PageSnapshot>,
}

#[derive(Debug, Clone)]
pub struct Extractor {
    search_terms: BTreeSet<String>,
    file_types: BTreeSet<String>,
}

impl Extractor {
    pub fn new(search_terms: BTreeSet<String>, file_types: BTreeSet<String>) -> Self {
        Self {
            search_terms,
            file_types,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.search_terms.clone(), config.file_types.clone())
    }

    pub fn extract(&self, document: &Document) -> Extraction {
        let html = Html::parse_document(&document.markup);

        let fragments = text::visible_fragments(&html);
        let matched_terms = text::matched_terms(&fragments.join(" "), &self.search_terms);
        let is_match = self.search_terms.is_empty() || !matched_terms.is_empty();

        let anchors = links::anchors(&html, &document.url);

        let snapshot = is_match.then(|| {
            snapshot::build_snapshot(&html, document.url.as_str(), &fragments, &anchors)
        });

        let links: Vec<Url> = anchors.into_iter().filter_map(|anchor| anchor.url).collect();
        let file_links = links
            .iter()
            .filter(|url| links::matches_file_type(url, &self.file_types))
            .cloned()
            .collect();

        Extraction {
            matched_terms,
            is_match,
            links,
            file_links,
            snapshot,
        }
    }

    // Everything the inspect command prints for one page.
    pub fn report(&self, document: &Document) -> PageReport {
        let html = Html::parse_document(&document.markup);
        let visible = text::visible_text(&html);

        PageReport {
            metadata: page::metadata(&html, &document.url),
            matched_terms: text::matched_terms(&visible, &self.search_terms),
            tables: page::tables(&html),
            images: page::image_urls(&html, &document.url),
            links: links::anchors(&html, &document.url)
                .into_iter()
                .map(|anchor| SnapshotLink {
                    href: anchor.href(),
                    text: anchor.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    #[serde(flatten)]
    pub metadata: PageMetadata,
    pub matched_terms: Vec<String>,
    pub tables: Vec<Table>,
    pub images: Vec<String>,
    pub links: Vec<SnapshotLink>,
}

// Selectors in this module are string constants, so parsing can only fail
// on a typo in our own source.
fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}
