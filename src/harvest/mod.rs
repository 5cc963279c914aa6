// src/harvest/mod.rs
// =============================================================================
// The file harvester.
//
// Given the file links found on a matched page, download each one with a
// single GET and write it under the output directory (see path.rs for the
// layout). A failed link is logged and skipped; it never stops the others,
// and it is never retried.
//
// The harvester is shared by all workers of a crawl run. It remembers which
// local paths it has used so that:
// - a source URL linked from several pages is downloaded only once
// - a different URL that maps onto an existing path overwrites the file and
//   replaces the earlier record, so every local path appears once
//
// Each local path has its own lock, held from the claim until the record is
// stored. Two workers writing the same path take turns, and the last one to
// claim it wins both the bytes on disk and the record.
// =============================================================================

mod path;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::fetch::{FetchError, Transport};

pub use path::save_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub source_url: String,
    pub local_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct Harvester {
    transport: Arc<dyn Transport>,
    output_dir: PathBuf,
    // local path -> source URL that last claimed it
    claimed: Mutex<HashMap<PathBuf, Arc<Mutex<Option<String>>>>>,
    downloaded: Mutex<Vec<DownloadedFile>>,
}

impl Harvester {
    pub fn new(transport: Arc<dyn Transport>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            output_dir: output_dir.into(),
            claimed: Mutex::new(HashMap::new()),
            downloaded: Mutex::new(Vec::new()),
        }
    }

    // Downloads every link in order and returns the files written by this call.
    pub async fn harvest(&self, links: &[Url], cancel: &CancellationToken) -> Vec<DownloadedFile> {
        let mut written = Vec::new();

        for link in links {
            if cancel.is_cancelled() {
                break;
            }

            let path = save_path(&self.output_dir, link);

            // Wait for our turn on this path, then claim it
            let slot = self.path_slot(&path).await;
            let mut owner = slot.lock().await;
            if owner.as_deref() == Some(link.as_str()) {
                tracing::debug!(url = %link, "File already harvested in this run");
                continue;
            }
            *owner = Some(link.to_string());

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(DownloadError::Fetch(FetchError::Cancelled)),
                result = self.download(link, &path) => result,
            };

            match result {
                Ok(file) => {
                    tracing::info!(url = %link, path = %file.local_path.display(), "Downloaded file");
                    // Recorded before the path lock is released
                    self.record(file.clone()).await;
                    written.push(file);
                }
                Err(e) => {
                    tracing::warn!(url = %link, error = %e, "Failed to download file");
                }
            }
        }

        written
    }

    /// All files downloaded so far in this run, one record per local path.
    pub async fn downloaded(&self) -> Vec<DownloadedFile> {
        self.downloaded.lock().await.clone()
    }

    async fn download(&self, link: &Url, path: &Path) -> Result<DownloadedFile, DownloadError> {
        let body = self.transport.get(link).await?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| DownloadError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, &body)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(DownloadedFile {
            source_url: link.to_string(),
            local_path: path.to_path_buf(),
        })
    }

    // The lock guarding one local path, created on first use.
    async fn path_slot(&self, path: &Path) -> Arc<Mutex<Option<String>>> {
        let mut claimed = self.claimed.lock().await;
        Arc::clone(claimed.entry(path.to_path_buf()).or_default())
    }

    async fn record(&self, file: DownloadedFile) {
        let mut downloaded = self.downloaded.lock().await;
        match downloaded.iter_mut().find(|f| f.local_path == file.local_path) {
            Some(existing) => *existing = file,
            None => downloaded.push(file),
        }
    }
}
