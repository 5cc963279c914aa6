// src/fetch/transport.rs
// =============================================================================
// The HTTP transport underneath the page fetcher and the file harvester.
//
// Transport is a trait so the crawl engine can be driven by an in-memory
// site in tests; HttpTransport is the real implementation on top of reqwest.
//
// Contract: one GET per call, bounded by the client's timeout, and anything
// that is not a 2xx response comes back as a FetchError.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::FetchError;

const USER_AGENT: &str = concat!("site-harvester/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a single GET and returns the response body.
    async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed transport. Cloning is cheap (the client is reference counted).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Ok(body.to_vec())
    }
}
