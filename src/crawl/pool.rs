// src/crawl/pool.rs
// =============================================================================
// The worker pool that drives a crawl run.
//
// A CrawlRun owns all mutable state of one crawl (frontier, visited set,
// collected snapshots, the harvester's file list) and is shared by its
// workers through an Arc. There is no global state: two runs in one process
// don't see each other.
//
// Each worker loops:
//   pop entry -> depth check -> claim URL -> fetch once -> extract
//     -> (on keyword match) record snapshot + harvest file links
//     -> enqueue non-file children at depth + 1 -> complete entry -> pop again
//
// A worker only stops when the frontier reports it is drained (queue empty
// and nothing in flight) or the run is cancelled. Per-page and per-file
// failures are logged and never end a worker.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::frontier::{Frontier, FrontierEntry, VisitedSet};
use crate::config::{ConfigError, CrawlConfig};
use crate::extract::{
    is_crawlable, matches_file_type, normalize, Extraction, Extractor, PageSnapshot,
};
use crate::fetch::{FetchError, PageFetcher, Transport};
use crate::harvest::{DownloadedFile, Harvester};

/// Everything a finished crawl hands back to the caller.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub snapshots: Vec<PageSnapshot>,
    pub downloaded_files: Vec<DownloadedFile>,
    pub stats: CrawlStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched successfully
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    /// Pages that passed the keyword gate (one snapshot each)
    pub pages_matched: usize,
    pub files_downloaded: usize,
    /// Entries dropped without a fetch (too deep or already visited)
    pub discarded: usize,
}

#[derive(Debug, Default)]
struct Counters {
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    pages_matched: AtomicUsize,
    discarded: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct CrawlRun {
    config: Arc<CrawlConfig>,
    fetcher: PageFetcher,
    extractor: Extractor,
    harvester: Harvester,
    frontier: Frontier,
    visited: VisitedSet,
    snapshots: Mutex<Vec<PageSnapshot>>,
    counters: Counters,
    cancel: CancellationToken,
}

impl CrawlRun {
    pub fn new(config: CrawlConfig, transport: Arc<dyn Transport>) -> Arc<Self> {
        let config = Arc::new(config);

        Arc::new(Self {
            fetcher: PageFetcher::new(Arc::clone(&transport)),
            extractor: Extractor::from_config(&config),
            harvester: Harvester::new(transport, config.output_dir.clone()),
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            snapshots: Mutex::new(Vec::new()),
            counters: Counters::default(),
            cancel: CancellationToken::new(),
            config,
        })
    }

    /// Cancelling this token stops the run: in-flight requests are abandoned
    /// and every worker drains.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // Runs the crawl to completion (or cancellation).
    //
    // Only configuration problems fail the run; they are reported before
    // any request is made.
    pub async fn execute(self: &Arc<Self>) -> Result<CrawlResult, ConfigError> {
        let seeds = self.config.prepare()?;

        tracing::info!(
            seeds = seeds.len(),
            max_depth = self.config.max_depth,
            concurrency = self.config.concurrency,
            terms = ?self.config.search_terms,
            "Starting crawl"
        );

        for seed in seeds {
            self.frontier.push(FrontierEntry::new(normalize(&seed), 0)).await;
        }

        let deadline = self.config.deadline.map(|limit| {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!(?limit, "Crawl deadline reached, cancelling");
                cancel.cancel();
            })
        });

        let workers = (0..self.config.concurrency).map(|id| {
            let run = Arc::clone(self);
            tokio::spawn(async move { run.worker(id).await })
        });

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Crawl worker stopped abnormally");
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let result = self.result().await;
        tracing::info!(
            visited = self.visited.len().await,
            pages_fetched = result.stats.pages_fetched,
            fetch_failures = result.stats.fetch_failures,
            pages_matched = result.stats.pages_matched,
            files_downloaded = result.stats.files_downloaded,
            cancelled = self.cancel.is_cancelled(),
            "Crawl finished"
        );

        Ok(result)
    }

    async fn worker(&self, id: usize) {
        loop {
            // Cancellation wins over pending work; closing the frontier
            // releases every other worker blocked in pop()
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.frontier.close().await;
                    None
                }
                entry = self.frontier.pop() => entry,
            };

            // None: drained or cancelled
            let Some(entry) = next else {
                break;
            };

            self.process(id, entry).await;

            // Always paired with the pop above, whatever process() did
            self.frontier.complete().await;
        }

        tracing::debug!(worker = id, "Worker drained");
    }

    async fn process(&self, worker: usize, entry: FrontierEntry) {
        let FrontierEntry { url, depth } = entry;

        // Step 1: Depth check
        // Too deep here doesn't mean unreachable: the same URL may still
        // arrive through a shorter path, so it is not marked visited.
        if depth > self.config.max_depth {
            Counters::bump(&self.counters.discarded);
            tracing::debug!(worker, url = %url, depth, "Discarding entry beyond max depth");
            return;
        }

        // Step 2: Claim the URL
        // Only the worker that wins the claim fetches; everyone else drops it
        if !self.visited.try_claim(&url).await {
            Counters::bump(&self.counters.discarded);
            tracing::debug!(worker, url = %url, depth, "Already visited");
            return;
        }

        // Step 3: Fetch the page, exactly once
        // A failed fetch is logged and counted. The URL stays visited, so it
        // is never retried, and it yields no children.
        tracing::debug!(worker, url = %url, depth, "Fetching");
        let document = match self.fetcher.fetch_until(&url, &self.cancel).await {
            Ok(document) => {
                Counters::bump(&self.counters.pages_fetched);
                document
            }
            Err(FetchError::Cancelled) => return,
            Err(e) => {
                Counters::bump(&self.counters.fetch_failures);
                tracing::warn!(worker, url = %url, depth, error = %e, "Failed to fetch page");
                return;
            }
        };

        // Step 4: Extract everything from one parse of the document
        let Extraction {
            matched_terms,
            is_match,
            links,
            file_links,
            snapshot,
        } = self.extractor.extract(&document);

        if !is_match {
            tracing::debug!(worker, url = %url, depth, "No search term on page");
        }

        // Step 5: Keyword gate
        // Only a matching page gets a snapshot and has its files harvested
        if let Some(snapshot) = snapshot {
            Counters::bump(&self.counters.pages_matched);
            tracing::info!(
                worker,
                url = %url,
                depth,
                terms = ?matched_terms,
                file_links = file_links.len(),
                "Page matched"
            );
            self.snapshots.lock().await.push(snapshot);
            self.harvester.harvest(&file_links, &self.cancel).await;
        }

        // Step 6: Enqueue children at depth + 1
        // Children are explored whether or not this page matched
        let child_depth = depth + 1;
        if child_depth > self.config.max_depth {
            return;
        }

        for link in links.iter().filter(|link| is_crawlable(link)) {
            // File links are the harvester's business, never pages to fetch
            if matches_file_type(link, &self.config.file_types) {
                continue;
            }

            let child = normalize(link);
            if self.visited.contains(&child).await {
                continue;
            }
            if !self.frontier.push(FrontierEntry::new(child, child_depth)).await {
                // Closed by cancellation
                break;
            }
        }
    }

    async fn result(&self) -> CrawlResult {
        let snapshots = self.snapshots.lock().await.clone();
        let downloaded_files = self.harvester.downloaded().await;

        let stats = CrawlStats {
            pages_fetched: self.counters.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.counters.fetch_failures.load(Ordering::Relaxed),
            pages_matched: self.counters.pages_matched.load(Ordering::Relaxed),
            files_downloaded: downloaded_files.len(),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        };

        CrawlResult {
            snapshots,
            downloaded_files,
            stats,
        }
    }
}
