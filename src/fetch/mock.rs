// src/fetch/mock.rs
// In-memory Transport used by the tests. Records every requested URL so tests
// can assert how many times each one was fetched.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{FetchError, Transport};

#[derive(Default)]
pub struct MockSite {
    routes: HashMap<String, Result<Vec<u8>, FetchError>>,
    delay: Option<Duration>,
    slow_routes: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.bytes(url, html.as_bytes())
    }

    pub fn bytes(mut self, url: &str, body: &[u8]) -> Self {
        self.routes.insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn status(mut self, url: &str, code: u16) -> Self {
        self.routes.insert(url.to_string(), Err(FetchError::Status(code)));
        self
    }

    /// Every response waits this long first; used to keep requests in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Only this URL waits before answering.
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow_routes.insert(url.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Transport for MockSite {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.slow_routes.get(url.as_str()).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        self.routes
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}
