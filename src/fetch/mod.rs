// src/fetch/mod.rs
// =============================================================================
// The page fetcher.
//
// Submodules:
// - error: FetchError, the taxonomy of per-URL failures
// - transport: the Transport trait and its reqwest implementation
//
// PageFetcher issues exactly one request per URL and hands back a Document.
// Every derived output (keyword verdict, links, file links, snapshot) is
// computed from that one Document; nothing downstream fetches a page again.
// =============================================================================

mod error;
mod transport;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::Url;

pub use error::FetchError;
pub use transport::{HttpTransport, Transport};

/// A fetched page: its (normalized) URL and the markup it returned.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: Url,
    pub markup: String,
}

#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let body = self.transport.get(url).await?;

        // Pages are decoded lossily; a stray invalid byte shouldn't cost us the page
        Ok(Document {
            url: url.clone(),
            markup: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Like `fetch`, but gives up as soon as `cancel` fires.
    pub async fn fetch_until(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<Document, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetch(url) => result,
        }
    }
}
