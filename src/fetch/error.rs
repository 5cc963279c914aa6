// src/fetch/error.rs
// =============================================================================
// Failure modes of a single GET.
//
// A FetchError never stops the crawl: the worker logs it, keeps the URL in
// the visited set and moves on. The harvester wraps it in a DownloadError.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request didn't finish within the per-request timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status code
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection could not be established (DNS, refused, unreachable)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Redirect loop or redirect limit exceeded
    #[error("too many redirects")]
    TooManyRedirects,

    /// The crawl was cancelled while the request was in flight
    #[error("cancelled")]
    Cancelled,

    /// Anything else reported by the HTTP client
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    // Classifies a reqwest error. The order matters: reqwest reports a timeout
    // during connect as both is_timeout() and is_connect().
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}
