// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// The CLI is also the configuration surface of a crawl: every CrawlConfig
// field can be set from here (see Commands::Crawl and CrawlArgs::to_config).
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{CrawlConfig, DEFAULT_FILE_TYPES, DEFAULT_TIMEOUT_SECS};

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl websites, snapshot pages that mention your keywords and download linked files",
    long_about = "site-harvester crawls outward from one or more seed URLs, keeps a structured \
                  snapshot of every page whose text mentions one of your search terms, and \
                  downloads the files (PDF, spreadsheets, ...) those pages link to."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from seed URLs, collect snapshots and harvest files
    ///
    /// Example: site-harvester crawl https://example.com --term price --max-depth 2
    Crawl(CrawlArgs),

    /// Fetch single pages and print metadata, keyword hits, tables, images and links as JSON
    ///
    /// Example: site-harvester inspect https://example.com --term cost
    Inspect {
        /// Pages to inspect (each is fetched once, nothing is followed)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Keyword to look for (repeatable)
        #[arg(long = "term")]
        terms: Vec<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },

    /// Re-export a JSON snapshot file as a CSV summary
    Convert {
        /// Snapshot JSON file written by `crawl`
        json: PathBuf,
        /// CSV file to write
        csv: PathBuf,
    },

    /// Print a CSV snapshot summary as a table
    Summary {
        /// CSV file written by `crawl` or `convert`
        csv: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed URLs to start from (depth 0)
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Keyword a page must mention to be snapshotted (repeatable).
    /// Without any, every page counts as a match.
    #[arg(long = "term")]
    pub terms: Vec<String>,

    /// File suffix to harvest, case-insensitive (repeatable).
    /// Defaults to .pdf, .xlsx and .csv
    #[arg(long = "file-type")]
    pub file_types: Vec<String>,

    /// Maximum link depth; seeds are depth 0
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Where harvested files and snapshot exports go
    #[arg(long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Stop the whole crawl after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Snapshot JSON path (default: <output-dir>/snapshots.json)
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Snapshot CSV summary path (default: <output-dir>/snapshots.csv)
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        let file_types: Vec<&str> = if self.file_types.is_empty() {
            DEFAULT_FILE_TYPES.to_vec()
        } else {
            self.file_types.iter().map(String::as_str).collect()
        };

        CrawlConfig::new(self.seeds.clone(), &self.output_dir)
            .with_search_terms(&self.terms)
            .with_file_types(file_types)
            .with_max_depth(self.max_depth)
            .with_concurrency(self.concurrency)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_deadline(self.deadline_secs.map(Duration::from_secs))
    }

    pub fn json_path(&self) -> PathBuf {
        self.json
            .clone()
            .unwrap_or_else(|| self.output_dir.join("snapshots.json"))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.csv
            .clone()
            .unwrap_or_else(|| self.output_dir.join("snapshots.csv"))
    }
}
