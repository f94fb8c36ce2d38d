//! Crawl orchestration
//!
//! Breadth-first traversal driving the admission filter, the fetcher, and
//! the extractor under depth/page-count limits, plus the bounded-
//! concurrency batch coordinator. Every crawl owns a fresh
//! [`session::CrawlSession`]; nothing is shared between invocations.

pub(crate) mod batch;
pub(crate) mod orchestrator;
mod session;

pub use batch::DEFAULT_BATCH_CONCURRENCY;
pub use session::CrawlSession;

use crate::options::CrawlOptions;
use crate::page::PageResult;
use crate::url::NormalizedUrl;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of a complete crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// Every fetched page, keyed by its normalized URL
    pub pages: BTreeMap<NormalizedUrl, PageResult>,

    pub metadata: CrawlMetadata,
}

/// Summary of a crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlMetadata {
    pub start_url: String,
    pub total_pages: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Deepest wave that fetched at least one page (0 = only the start URL)
    pub depth_reached: u32,

    /// The options this crawl ran with, echoed back
    pub options: CrawlOptions,
}
