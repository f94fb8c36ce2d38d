//! Pagesift: a crawl-and-extract engine for structured web content
//!
//! This crate fetches web pages (direct HTTP or scripted headless-browser
//! rendering), extracts structured content in multiple output formats, and
//! discovers reachable pages under domain/path constraints.

pub mod crawl;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod jobs;
pub mod options;
pub mod page;
pub mod url;

use thiserror::Error;

/// Main error type for pagesift operations
///
/// Per-page failures (a fetch or extraction error for a single URL) are not
/// represented here; they are recorded on the affected [`page::PageResult`]
/// and never abort a surrounding crawl or batch. This type covers failures
/// that do surface to the caller: malformed options, an unusable start URL,
/// or infrastructure errors (HTTP client construction, the job store,
/// serialization).
#[derive(Debug, Error)]
pub enum PagesiftError {
    #[error("invalid options: {0}")]
    Validation(String),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("page error for {url}: {message}")]
    Page { url: String, message: String },

    #[error("options file error: {0}")]
    Options(#[from] options::OptionsError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("job store error: {0}")]
    Store(#[from] jobs::StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("failed to parse URL: {0}")]
    Parse(String),

    #[error("invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("missing host in URL")]
    MissingHost,
}

/// Result type alias for pagesift operations
pub type Result<T> = std::result::Result<T, PagesiftError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crawl::{CrawlMetadata, CrawlResult};
pub use engine::Engine;
pub use extract::ExtractError;
pub use fetch::FetchError;
pub use jobs::{JobRecord, JobStatus, JobStore, Operation, SqliteJobStore};
pub use options::{Action, CrawlOptions, MapOptions, OutputFormat, PageOptions};
pub use page::{PageLink, PageMetadata, PageResult};
pub use self::url::{normalize_url, same_domain, should_crawl, NormalizedUrl};
