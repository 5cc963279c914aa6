// src/main.rs
// =============================================================================
// Entry point of the site-harvester CLI.
//
// What happens here:
// 1. Install the tracing subscriber (logs go to stderr, results to stdout)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the subcommand handler
// 4. Exit with a proper code (0 = success, 1 = nothing matched, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod extract;
mod fetch;
mod harvest;
mod store;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, CrawlArgs};
use crawl::CrawlRun;
use extract::Extractor;
use fetch::{HttpTransport, PageFetcher};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,site_harvester=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(&args).await,
        Commands::Inspect {
            urls,
            terms,
            timeout_secs,
        } => handle_inspect(&urls, &terms, timeout_secs).await,
        Commands::Convert { json, csv } => handle_convert(&json, &csv),
        Commands::Summary { csv } => handle_summary(&csv),
    }
}

// Handles the 'crawl' subcommand
//
// Returns Ok(1) when the crawl ran but no page matched the search terms.
async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let config = args.to_config();
    let transport = HttpTransport::new(config.request_timeout)
        .context("Failed to create HTTP client")?;

    let run = CrawlRun::new(config, Arc::new(transport));

    // Ctrl-C stops the crawl but still writes out what we have so far
    let cancel = run.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl");
            cancel.cancel();
        }
    });

    let result = run.execute().await?;

    let json_path = args.json_path();
    let csv_path = args.csv_path();
    store::export_json(&json_path, &result.snapshots)?;
    store::export_csv(&csv_path, &result.snapshots)?;

    println!("📄 Snapshots: {}", result.snapshots.len());
    for snapshot in &result.snapshots {
        println!("   {}  {}", snapshot.url, snapshot.title);
    }
    println!("📦 Downloaded files: {}", result.downloaded_files.len());
    for file in &result.downloaded_files {
        println!("   {} -> {}", file.source_url, file.local_path.display());
    }
    println!();
    println!("📊 Summary:");
    println!("   Pages fetched: {}", result.stats.pages_fetched);
    println!("   Fetch failures: {}", result.stats.fetch_failures);
    println!("   Pages matched: {}", result.stats.pages_matched);
    println!("   Skipped (visited or too deep): {}", result.stats.discarded);
    println!("   JSON: {}", json_path.display());
    println!("   CSV: {}", csv_path.display());

    if result.snapshots.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'inspect' subcommand
//
// Each URL is fetched once; a failed fetch shows up as an error entry in the
// output rather than aborting the others.
async fn handle_inspect(urls: &[String], terms: &[String], timeout_secs: u64) -> Result<i32> {
    let transport = HttpTransport::new(Duration::from_secs(timeout_secs))
        .context("Failed to create HTTP client")?;
    let fetcher = PageFetcher::new(Arc::new(transport));
    let extractor = Extractor::new(
        terms.iter().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()).collect(),
        Default::default(),
    );

    let mut reports = Vec::new();
    let mut failures = 0;

    for raw in urls {
        let url = match url::Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                failures += 1;
                reports.push(serde_json::json!({ "url": raw, "error": e.to_string() }));
                continue;
            }
        };

        match fetcher.fetch(&url).await {
            Ok(document) => reports.push(serde_json::to_value(extractor.report(&document))?),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch page");
                failures += 1;
                reports.push(serde_json::json!({ "url": url.as_str(), "error": e.to_string() }));
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);

    if failures == urls.len() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'convert' subcommand
fn handle_convert(json: &Path, csv: &Path) -> Result<i32> {
    let snapshots = store::import_json(json)?;
    store::export_csv(csv, &snapshots)?;
    println!("✅ Wrote {} row(s) to {}", snapshots.len(), csv.display());
    Ok(0)
}

// Handles the 'summary' subcommand: prints the CSV summary as a table
fn handle_summary(csv: &Path) -> Result<i32> {
    let rows = store::import_csv(csv)?;

    println!(
        "{:<50} {:<30} {:>6} {:>9} {:>8}",
        "URL", "TITLE", "LINKS", "HEADINGS", "JSON-LD"
    );
    println!("{}", "=".repeat(107));

    for row in &rows {
        println!(
            "{:<50} {:<30} {:>6} {:>9} {:>8}",
            shorten(&row.url, 50),
            shorten(&row.title, 30),
            row.num_links,
            row.num_headings,
            row.num_json_ld
        );
    }

    println!();
    println!("📋 Total: {}", rows.len());
    Ok(0)
}

// Truncates for table display, marking the cut with "..."
fn shorten(text: &str, width: usize) -> String {
    match extract::truncate_chars(text, width.saturating_sub(3)) {
        (cut, true) if text.chars().count() > width => format!("{cut}..."),
        _ => text.to_string(),
    }
}
