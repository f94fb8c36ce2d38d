//! The engine: stateless, reentrant entry points
//!
//! An [`Engine`] owns only the shared direct-mode HTTP client. All crawl
//! state lives in a per-invocation session, so one engine instance can
//! serve concurrent scrapes, crawls, and maps.
//!
//! # Example
//!
//! ```no_run
//! use pagesift::{Engine, OutputFormat, PageOptions};
//!
//! # async fn example() -> pagesift::Result<()> {
//! let engine = Engine::new()?;
//! let page = engine
//!     .scrape(
//!         "https://example.com/",
//!         &[OutputFormat::Markdown],
//!         &PageOptions::default(),
//!     )
//!     .await;
//! println!("{}", page.content[&OutputFormat::Markdown]);
//! # Ok(())
//! # }
//! ```

use crate::crawl::{batch, orchestrator, CrawlResult};
use crate::extract::extract_page;
use crate::fetch::{fetch_with_browser, FetchError, FetchedPage, HttpFetcher};
use crate::options::{CrawlOptions, MapOptions, OutputFormat, PageOptions};
use crate::page::PageResult;
use crate::url::NormalizedUrl;
use crate::Result;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Stateless crawl-and-extract engine
#[derive(Debug, Clone)]
pub struct Engine {
    http: HttpFetcher,
}

impl Engine {
    /// Creates an engine with a fresh direct-mode HTTP client
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new()?,
        })
    }

    /// Creates an engine around an existing fetcher (custom timeout, tests)
    pub fn with_fetcher(http: HttpFetcher) -> Self {
        Self { http }
    }

    /// Fetches and extracts a single page
    ///
    /// Never returns an error: fetch and extraction failures are recorded
    /// on the returned [`PageResult`].
    pub async fn scrape(
        &self,
        url: &str,
        formats: &[OutputFormat],
        options: &PageOptions,
    ) -> PageResult {
        tracing::debug!(%url, ?formats, use_browser = options.use_browser, "scraping page");

        let mut result = PageResult::new(url);

        let fetched = match self.fetch_page(url, options).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(%url, error = %e, "fetch failed");
                result.error = Some(e.to_string());
                return result;
            }
        };

        result.metadata.http_status = Some(fetched.status);
        result.metadata.final_url = fetched.final_url.clone();

        if fetched.content.is_empty() {
            result.error = Some(FetchError::EmptyBody.to_string());
            return result;
        }

        match extract_page(
            &fetched.content,
            formats,
            options,
            url,
            &fetched.final_url,
            fetched.status,
        ) {
            Ok(extraction) => {
                result.metadata = extraction.metadata;
                result.content = extraction.content;
                result.links = extraction.links;
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "extraction failed");
                result.error = Some(format!("content processing failed: {e}"));
                result.content.clear();
            }
        }

        result
    }

    /// Scrapes a list of independent URLs under a concurrency cap
    ///
    /// The result map preserves the caller's original URL strings as keys;
    /// a failing URL carries an error entry and never aborts its siblings.
    pub async fn scrape_batch(
        &self,
        urls: &[String],
        formats: &[OutputFormat],
        options: &PageOptions,
        concurrency: usize,
    ) -> BTreeMap<String, PageResult> {
        batch::scrape_batch(self, urls, formats, options, concurrency).await
    }

    /// Crawls breadth-first from a start URL
    ///
    /// Fails synchronously with a validation error for malformed options;
    /// per-page failures are recorded in the result and the crawl
    /// continues.
    pub async fn crawl(&self, start_url: &str, options: &CrawlOptions) -> Result<CrawlResult> {
        self.crawl_with_cancel(start_url, options, CancellationToken::new())
            .await
    }

    /// Crawls with an explicit cancellation token
    ///
    /// The token is honored at wave boundaries and before each fetch; a
    /// cancelled crawl returns the pages it already collected.
    pub async fn crawl_with_cancel(
        &self,
        start_url: &str,
        options: &CrawlOptions,
        cancel: CancellationToken,
    ) -> Result<CrawlResult> {
        orchestrator::run_crawl(self, start_url, options, cancel).await
    }

    /// Collects the URLs reachable from one page, without recursing
    pub async fn map(&self, url: &str, options: &MapOptions) -> Result<Vec<NormalizedUrl>> {
        orchestrator::run_map(self, url, options).await
    }

    async fn fetch_page(
        &self,
        url: &str,
        options: &PageOptions,
    ) -> std::result::Result<FetchedPage, FetchError> {
        if options.use_browser {
            // Proxy support is direct-mode only.
            fetch_with_browser(url, options).await
        } else {
            self.http
                .fetch(url, options.max_retries, options.proxy.as_deref())
                .await
        }
    }
}
