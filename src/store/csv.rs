// src/store/csv.rs
// =============================================================================
// Flattened CSV summary of snapshots.
//
// Header: url,title,main_text_snippet,num_links,num_headings,num_json_ld
//
// The snippet is cut to 300 characters and every comma, CR and LF in it is
// replaced by one space, so the column never needs quoting and keeps its
// length. The counts come from the matching JSON fields.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::{truncate_chars, PageSnapshot};

/// Longest snippet kept in the CSV summary, in characters.
pub const CSV_SNIPPET_MAX_CHARS: usize = 300;

// Field order here is the column order of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub url: String,
    pub title: String,
    pub main_text_snippet: String,
    pub num_links: usize,
    pub num_headings: usize,
    pub num_json_ld: usize,
}

impl From<&PageSnapshot> for SnapshotSummary {
    fn from(snapshot: &PageSnapshot) -> Self {
        Self {
            url: snapshot.url.clone(),
            title: snapshot.title.clone(),
            main_text_snippet: flatten_snippet(&snapshot.main_text_snippet),
            num_links: snapshot.links.len(),
            num_headings: snapshot.heading_count(),
            num_json_ld: snapshot.structured_data.len(),
        }
    }
}

pub fn export_csv(path: &Path, snapshots: &[PageSnapshot]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for snapshot in snapshots {
        writer
            .serialize(SnapshotSummary::from(snapshot))
            .with_context(|| format!("Failed to write row for {}", snapshot.url))?;
    }

    // An empty export still gets its header row
    if snapshots.is_empty() {
        writer.write_record([
            "url",
            "title",
            "main_text_snippet",
            "num_links",
            "num_headings",
            "num_json_ld",
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn import_csv(path: &Path) -> Result<Vec<SnapshotSummary>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<SnapshotSummary>, _>>()
        .with_context(|| format!("{} is not a snapshot summary", path.display()))
}

fn flatten_snippet(snippet: &str) -> String {
    let (cut, _) = truncate_chars(snippet, CSV_SNIPPET_MAX_CHARS);
    cut.chars()
        .map(|c| if matches!(c, ',' | '\n' | '\r') { ' ' } else { c })
        .collect()
}
