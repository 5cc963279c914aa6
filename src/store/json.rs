// src/store/json.rs
// Snapshots as a pretty-printed JSON array. Non-ASCII text is written as-is.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::extract::PageSnapshot;

pub fn export_json(path: &Path, snapshots: &[PageSnapshot]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, snapshots)
        .with_context(|| format!("Failed to write snapshots to {}", path.display()))?;
    writer.flush()?;

    Ok(())
}

pub fn import_json(path: &Path) -> Result<Vec<PageSnapshot>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a snapshot file", path.display()))
}
