// src/config.rs
// =============================================================================
// Crawl configuration.
//
// The CLI (src/cli.rs) collects raw values from the user; this module turns
// them into a CrawlConfig that stays immutable for the whole crawl run.
//
// prepare() is the only place that can fail fatally: a bad seed, a zero-sized
// worker pool, or an output directory we cannot create all stop the crawl
// before any request is made.
// =============================================================================

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// File suffixes harvested when the user doesn't pass any.
pub const DEFAULT_FILE_TYPES: &[&str] = &[".pdf", ".xlsx", ".csv"];

/// Fatal configuration problems, surfaced before the crawl starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no seed URLs were given")]
    NoSeeds,

    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Everything one crawl run needs to know.
//
// Search terms and file types are stored lower-cased in ordered sets, so
// matching is case-insensitive and the reported order is stable.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seeds: Vec<String>,
    pub search_terms: BTreeSet<String>,
    pub file_types: BTreeSet<String>,
    pub max_depth: usize,
    pub concurrency: usize,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    /// Overall crawl deadline; `None` lets the crawl run until the frontier drains.
    pub deadline: Option<Duration>,
}

impl CrawlConfig {
    pub fn new(seeds: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            seeds,
            search_terms: BTreeSet::new(),
            file_types: normalize_set(DEFAULT_FILE_TYPES.iter().copied()),
            max_depth: 1,
            concurrency: 4,
            output_dir: output_dir.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deadline: None,
        }
    }

    pub fn with_search_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.search_terms = normalize_set(terms);
        self
    }

    pub fn with_file_types<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.file_types = normalize_set(suffixes);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    // Validates the configuration and creates the output directory.
    //
    // Returns the parsed seed URLs so the crawl doesn't parse them twice.
    pub fn prepare(&self) -> Result<Vec<Url>, ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }

        let seeds = self
            .seeds
            .iter()
            .map(|seed| parse_seed(seed))
            .collect::<Result<Vec<_>, _>>()?;

        create_output_dir(&self.output_dir)?;

        Ok(seeds)
    }
}

fn parse_seed(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed.trim()).map_err(|e| ConfigError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidSeed {
            url: seed.to_string(),
            reason: "only http(s) URLs with a host can be crawled".to_string(),
        });
    }

    Ok(url)
}

fn create_output_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

// Trims, lower-cases and de-duplicates; blank entries are dropped.
fn normalize_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
