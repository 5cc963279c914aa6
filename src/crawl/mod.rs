// src/crawl/mod.rs
// =============================================================================
// The concurrent crawl engine.
//
// Submodules:
// - frontier: the shared FIFO of (url, depth) entries and the visited set
// - pool: CrawlRun, the worker pool that drains the frontier
//
// Traversal is breadth-first in spirit (a child is always parent depth + 1)
// but workers run concurrently, so a depth-2 page can finish before the last
// depth-1 page does.
// =============================================================================

mod frontier;
mod pool;

pub use pool::CrawlRun;

#[cfg(test)]
mod tests {
    use super::pool::CrawlResult;
    use super::*;
    use crate::config::{ConfigError, CrawlConfig};
    use crate::fetch::mock::MockSite;
    use crate::fetch::Transport;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    async fn crawl(
        config: CrawlConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<CrawlResult, ConfigError> {
        CrawlRun::new(config, transport).execute().await
    }

    fn config(seeds: &[&str], out: &Path) -> CrawlConfig {
        CrawlConfig::new(seeds.iter().map(|s| s.to_string()).collect(), out)
    }

    fn snapshot_urls(result: &CrawlResult) -> Vec<String> {
        let mut urls: Vec<_> = result.snapshots.iter().map(|s| s.url.clone()).collect();
        urls.sort();
        urls
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_end_to_end_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page(
                    "http://a.test/",
                    r#"<html><body><p>foo bar</p>
                       <a href="http://a.test/b">next</a>
                       <a href="http://a.test/doc.pdf">report</a></body></html>"#,
                )
                .page(
                    "http://a.test/b",
                    r#"<p>baz</p><a href="http://a.test/c">deeper</a>"#,
                )
                .bytes("http://a.test/doc.pdf", b"%PDF-1.4"),
        );

        let config = config(&["http://a.test"], dir.path())
            .with_max_depth(1)
            .with_search_terms(["foo"])
            .with_concurrency(2);
        let result = crawl(config, site.clone()).await.unwrap();

        assert_eq!(snapshot_urls(&result), vec!["http://a.test/"]);

        assert_eq!(result.downloaded_files.len(), 1);
        let file = &result.downloaded_files[0];
        assert_eq!(file.source_url, "http://a.test/doc.pdf");
        assert_eq!(file.local_path, dir.path().join("a.test").join("pdf").join("doc.pdf"));
        assert_eq!(std::fs::read(&file.local_path).unwrap(), b"%PDF-1.4");

        // b is crawled at depth 1 but has no "foo"; c would be depth 2
        assert_eq!(site.request_count("http://a.test/b"), 1);
        assert_eq!(site.request_count("http://a.test/c"), 0);
        // The pdf is harvested, never fetched again as a page
        assert_eq!(site.request_count("http://a.test/doc.pdf"), 1);
        assert_eq!(result.stats.pages_fetched, 2);
        assert_eq!(result.stats.pages_matched, 1);
    }

    #[tokio::test]
    async fn test_file_links_never_become_pages() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://a.test/", r#"<a href="/doc.pdf">report</a>"#)
                .bytes("http://a.test/doc.pdf", b"%PDF-1.4 binary"),
        );

        // No search terms: every fetched page would be snapshotted
        let config = config(&["http://a.test/"], dir.path()).with_max_depth(2);
        let result = crawl(config, site.clone()).await.unwrap();

        assert_eq!(snapshot_urls(&result), vec!["http://a.test/"]);
        assert_eq!(site.request_count("http://a.test/doc.pdf"), 1);
        assert_eq!(result.downloaded_files.len(), 1);
        assert_eq!(result.stats.pages_fetched, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_url_is_fetched_twice() {
        let dir = tempfile::tempdir().unwrap();

        // Every page links to every page, fragments included
        let pages = ["/", "/1", "/2", "/3", "/4", "/5"];
        let links: String = pages
            .iter()
            .map(|p| format!(r#"<a href="{p}">x</a><a href="{p}#top">y</a>"#))
            .collect();
        let mut site = MockSite::new();
        for page in pages {
            site = site.page(&format!("http://mesh.test{page}"), &links);
        }
        let site = Arc::new(site);

        let config = config(&["http://mesh.test/", "http://mesh.test/#again"], dir.path())
            .with_max_depth(3)
            .with_concurrency(8);
        let result = crawl(config, site.clone()).await.unwrap();

        let requests = site.requests();
        assert_eq!(requests.len(), pages.len());
        for page in pages {
            assert_eq!(site.request_count(&format!("http://mesh.test{page}")), 1);
        }
        assert_eq!(result.stats.pages_fetched, pages.len());
        assert_eq!(result.snapshots.len(), pages.len());
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://chain.test/", r#"<a href="/1">1</a>"#)
                .page("http://chain.test/1", r#"<a href="/2">2</a>"#)
                .page("http://chain.test/2", r#"<a href="/3">3</a>"#)
                .page("http://chain.test/3", "end"),
        );

        let config = config(&["http://chain.test/"], dir.path()).with_max_depth(2);
        let result = crawl(config, site.clone()).await.unwrap();

        assert_eq!(site.request_count("http://chain.test/2"), 1);
        assert_eq!(site.request_count("http://chain.test/3"), 0);
        assert_eq!(result.stats.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_max_depth_zero_fetches_only_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://a.test/", r#"<a href="/next">next</a>"#)
                .page("http://a.test/next", "next"),
        );

        let config = config(&["http://a.test/"], dir.path()).with_max_depth(0);
        crawl(config, site.clone()).await.unwrap();

        assert_eq!(site.requests(), vec!["http://a.test/"]);
    }

    #[tokio::test]
    async fn test_non_matching_page_still_explores_children() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page(
                    "http://a.test/",
                    r#"<p>nothing relevant</p>
                       <a href="/prices">next</a>
                       <a href="/skip.pdf">file</a>"#,
                )
                .page("http://a.test/prices", "<p>Our PRICE list</p>")
                .bytes("http://a.test/skip.pdf", b"pdf"),
        );

        let config = config(&["http://a.test/"], dir.path())
            .with_max_depth(1)
            .with_search_terms(["price"]);
        let result = crawl(config, site.clone()).await.unwrap();

        // The root has no "price": no snapshot, but its child is still crawled
        assert_eq!(snapshot_urls(&result), vec!["http://a.test/prices"]);
        assert_eq!(site.request_count("http://a.test/"), 1);
        assert_eq!(result.stats.pages_matched, 1);
        // The pdf is only linked from the non-matching page: never requested
        assert!(result.downloaded_files.is_empty());
        assert_eq!(site.request_count("http://a.test/skip.pdf"), 0);
        assert!(!dir.path().join("a.test").exists());
    }

    #[tokio::test]
    async fn test_empty_filter_snapshots_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://a.test/", r#"<a href="/x">x</a>"#)
                .page("http://a.test/x", "<h1>X</h1>"),
        );

        let config = config(&["http://a.test/"], dir.path()).with_max_depth(1);
        let result = crawl(config, site).await.unwrap();

        assert_eq!(snapshot_urls(&result), vec!["http://a.test/", "http://a.test/x"]);
    }

    #[tokio::test]
    async fn test_fetch_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page(
                    "http://a.test/",
                    r#"<a href="/broken">b</a><a href="/fine">f</a>"#,
                )
                .status("http://a.test/broken", 500)
                .page("http://a.test/fine", "fine"),
        );

        let config = config(&["http://a.test/", "http://down.test/"], dir.path()).with_max_depth(1);
        let result = crawl(config, site.clone()).await.unwrap();

        assert_eq!(result.stats.fetch_failures, 2);
        assert_eq!(result.stats.pages_fetched, 2);
        assert_eq!(site.request_count("http://a.test/broken"), 1);
        assert!(snapshot_urls(&result).contains(&"http://a.test/fine".to_string()));
    }

    #[tokio::test]
    async fn test_deadline_drains_workers() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://slow.test/", "slow")
                .with_delay(Duration::from_secs(30)),
        );

        let config = config(&["http://slow.test/"], dir.path())
            .with_concurrency(3)
            .with_deadline(Some(Duration::from_millis(50)));

        let result = tokio::time::timeout(Duration::from_secs(5), crawl(config, site))
            .await
            .expect("cancelled crawl must finish promptly")
            .unwrap();
        assert!(result.snapshots.is_empty());
        assert_eq!(result.stats.pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_external_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            MockSite::new()
                .page("http://slow.test/", "slow")
                .with_delay(Duration::from_secs(30)),
        );

        let run = CrawlRun::new(config(&["http://slow.test/"], dir.path()), site);
        let cancel = run.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), run.execute())
            .await
            .expect("cancelled crawl must finish promptly");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_configuration_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(MockSite::new());

        let config = config(&["not a url"], dir.path());
        let result = crawl(config, site.clone()).await;

        assert!(matches!(result, Err(ConfigError::InvalidSeed { .. })));
        assert!(site.requests().is_empty());
    }
}
