//! Pagesift command-line interface
//!
//! Thin wrapper over the engine: scrape, crawl, map, and batch-scrape from
//! the terminal, printing results as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagesift::jobs::{run_batch_job, run_crawl_job, run_map_job, run_scrape_job};
use pagesift::options::{load_options, CrawlOptions, MapOptions, OutputFormat, PageOptions};
use pagesift::{Engine, JobStore, SqliteJobStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pagesift: crawl-and-extract engine for structured web content
#[derive(Parser, Debug)]
#[command(name = "pagesift")]
#[command(version)]
#[command(about = "Fetch, extract, and map web content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// TOML options file ([crawl], [map], and [page] tables)
    #[arg(long, global = true, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Record the run in a SQLite job database
    #[arg(long, global = true, value_name = "FILE")]
    jobs_db: Option<PathBuf>,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and extract a single page
    Scrape {
        url: String,

        /// Output formats to generate
        #[arg(long = "format", value_delimiter = ',', default_values = ["markdown"])]
        formats: Vec<OutputFormat>,
    },

    /// Crawl breadth-first from a start URL
    Crawl { url: String },

    /// List the URLs reachable from a page
    Map {
        url: String,

        /// Case-insensitive substring filter on the result list
        #[arg(long)]
        search: Option<String>,
    },

    /// Scrape a list of URLs under a concurrency cap
    Batch {
        urls: Vec<String>,

        #[arg(long = "format", value_delimiter = ',', default_values = ["markdown"])]
        formats: Vec<OutputFormat>,

        #[arg(long, default_value_t = pagesift::crawl::DEFAULT_BATCH_CONCURRENCY)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let file_options = match &cli.options {
        Some(path) => {
            load_options(path).with_context(|| format!("loading options from {}", path.display()))?
        }
        None => Default::default(),
    };

    let store = match &cli.jobs_db {
        Some(path) => Some(
            SqliteJobStore::new(path)
                .with_context(|| format!("opening job database {}", path.display()))?,
        ),
        None => None,
    };

    let engine = Engine::new().context("building HTTP client")?;

    let json = match cli.command {
        Command::Scrape { url, formats } => {
            let page_options = file_options.page.unwrap_or_default();
            if let Some(store) = &store {
                let job_id = run_scrape_job(&engine, store, &url, &formats, &page_options).await?;
                job_report(store, &job_id)?
            } else {
                let page = engine.scrape(&url, &formats, &page_options).await;
                serde_json::to_string_pretty(&page)?
            }
        }

        Command::Crawl { url } => {
            let crawl_options: CrawlOptions = file_options.crawl.unwrap_or_default();
            if let Some(store) = &store {
                let job_id = run_crawl_job(&engine, store, &url, &crawl_options).await?;
                job_report(store, &job_id)?
            } else {
                let result = engine.crawl(&url, &crawl_options).await?;
                serde_json::to_string_pretty(&result)?
            }
        }

        Command::Map { url, search } => {
            let mut map_options: MapOptions = file_options.map.unwrap_or_default();
            if search.is_some() {
                map_options.search = search;
            }
            if let Some(store) = &store {
                let job_id = run_map_job(&engine, store, &url, &map_options).await?;
                job_report(store, &job_id)?
            } else {
                let urls = engine.map(&url, &map_options).await?;
                serde_json::to_string_pretty(&urls)?
            }
        }

        Command::Batch {
            urls,
            formats,
            concurrency,
        } => {
            let page_options: PageOptions = file_options.page.unwrap_or_default();
            if let Some(store) = &store {
                let job_id =
                    run_batch_job(&engine, store, &urls, &formats, &page_options, concurrency)
                        .await?;
                job_report(store, &job_id)?
            } else {
                let results = engine
                    .scrape_batch(&urls, &formats, &page_options, concurrency)
                    .await;
                serde_json::to_string_pretty(&results)?
            }
        }
    };

    emit(&json, cli.output.as_deref())?;
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagesift=info,warn"),
            1 => EnvFilter::new("pagesift=debug,info"),
            2 => EnvFilter::new("pagesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders the recorded job for display after a tracked run
fn job_report(store: &SqliteJobStore, job_id: &str) -> anyhow::Result<String> {
    let record = store
        .get_job_status(job_id)?
        .context("job record missing after run")?;
    Ok(serde_json::to_string_pretty(&record)?)
}

fn emit(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("result written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
