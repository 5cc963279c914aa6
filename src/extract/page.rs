// src/extract/page.rs
// =============================================================================
// Single-page extras used by the `inspect` command: page metadata, HTML
// tables and image URLs. None of these take part in the crawl itself.
// =============================================================================

use scraper::Html;
use serde::Serialize;
use url::Url;

use super::links::resolve_url;
use super::selector;
use super::snapshot::title;
use super::text::squash_whitespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
}

/// A table as rows of cell text.
pub type Table = Vec<Vec<String>>;

pub fn metadata(document: &Html, url: &Url) -> PageMetadata {
    let description = document
        .select(&selector(r#"meta[name="description"]"#))
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    PageMetadata {
        url: url.to_string(),
        title: title(document),
        description,
    }
}

// Every <table> as rows of th/td text. Rows without cells and tables without
// rows are left out.
pub fn tables(document: &Html) -> Vec<Table> {
    let row_selector = selector("tr");
    let cell_selector = selector("th, td");

    document
        .select(&selector("table"))
        .map(|table| {
            table
                .select(&row_selector)
                .map(|row| {
                    row.select(&cell_selector)
                        .map(|cell| squash_whitespace(&cell.text().collect::<String>()))
                        .collect::<Vec<_>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect::<Table>()
        })
        .filter(|rows| !rows.is_empty())
        .collect()
}

pub fn image_urls(document: &Html, base: &Url) -> Vec<String> {
    document
        .select(&selector("img[src]"))
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| resolve_url(base, src))
        .map(|url| url.to_string())
        .collect()
}
