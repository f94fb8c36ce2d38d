//! Job tracking
//!
//! The engine consumes a narrow job-store contract: create a job record,
//! update it to completed/failed, and read it back. [`SqliteJobStore`] is
//! the bundled implementation; anything satisfying [`JobStore`] works.
//!
//! Propagation policy: a job is marked `failed` only when the whole
//! operation errors (validation failure, unusable start URL). Per-page
//! failures inside a successful crawl leave the job `completed` with
//! error-annotated pages in the result blob.

mod sqlite;

pub use sqlite::SqliteJobStore;

use crate::engine::Engine;
use crate::options::{CrawlOptions, MapOptions, OutputFormat, PageOptions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Job store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp in store: {0}")]
    InvalidTimestamp(String),
}

/// The operation a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Scrape,
    Crawl,
    Map,
    Batch,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scrape => "scrape",
            Self::Crawl => "crawl",
            Self::Map => "map",
            Self::Batch => "batch",
        }
    }

    pub fn from_db_string(value: &str) -> Option<Self> {
        match value {
            "scrape" => Some(Self::Scrape),
            "crawl" => Some(Self::Crawl),
            "map" => Some(Self::Map),
            "batch" => Some(Self::Batch),
            _ => None,
        }
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A job record as returned by [`JobStore::get_job_status`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub url: String,
    pub operation: Operation,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,

    /// Result blob, present once the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// The job-store contract the engine consumes
///
/// The engine treats the store purely as a sink/source of opaque job
/// records; it depends on nothing beyond these three operations.
pub trait JobStore {
    /// Creates a pending job and returns its id
    fn create_job(
        &self,
        url: &str,
        operation: Operation,
        formats: &[OutputFormat],
        page_options: &PageOptions,
    ) -> Result<String, StoreError>;

    /// Moves a job to completed or failed, recording the result or error
    ///
    /// Updating an unknown job id is a silent no-op.
    fn update_job(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    /// Reads a job record; absent ids return `None`
    fn get_job_status(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError>;
}

/// Runs a scrape and records it as a job
///
/// A scrape never fails as a whole; even an error-annotated page leaves the
/// job `completed`.
pub async fn run_scrape_job(
    engine: &Engine,
    store: &dyn JobStore,
    url: &str,
    formats: &[OutputFormat],
    options: &PageOptions,
) -> crate::Result<String> {
    let job_id = store.create_job(url, Operation::Scrape, formats, options)?;
    let page = engine.scrape(url, formats, options).await;
    let blob = serde_json::to_value(&page)?;
    store.update_job(&job_id, JobStatus::Completed, Some(blob), None)?;
    Ok(job_id)
}

/// Runs a crawl and records it as a job
pub async fn run_crawl_job(
    engine: &Engine,
    store: &dyn JobStore,
    start_url: &str,
    options: &CrawlOptions,
) -> crate::Result<String> {
    let job_id = store.create_job(
        start_url,
        Operation::Crawl,
        &options.formats,
        &options.page_options,
    )?;

    match engine.crawl(start_url, options).await {
        Ok(result) => {
            let blob = serde_json::to_value(&result)?;
            store.update_job(&job_id, JobStatus::Completed, Some(blob), None)?;
        }
        Err(e) => {
            tracing::error!(%start_url, error = %e, "crawl job failed");
            store.update_job(&job_id, JobStatus::Failed, None, Some(e.to_string()))?;
        }
    }

    Ok(job_id)
}

/// Runs a batch scrape and records it as a single job
///
/// The batch is keyed under the first URL (the job schema tracks one URL
/// per record); the result blob carries every entry. Like a single scrape,
/// a batch always completes: failures live on the per-URL entries.
pub async fn run_batch_job(
    engine: &Engine,
    store: &dyn JobStore,
    urls: &[String],
    formats: &[OutputFormat],
    options: &PageOptions,
    concurrency: usize,
) -> crate::Result<String> {
    let first_url = urls.first().map(String::as_str).unwrap_or_default();
    let job_id = store.create_job(first_url, Operation::Batch, formats, options)?;
    let results = engine
        .scrape_batch(urls, formats, options, concurrency)
        .await;
    let blob = serde_json::to_value(&results)?;
    store.update_job(&job_id, JobStatus::Completed, Some(blob), None)?;
    Ok(job_id)
}

/// Runs a map and records it as a job
pub async fn run_map_job(
    engine: &Engine,
    store: &dyn JobStore,
    url: &str,
    options: &MapOptions,
) -> crate::Result<String> {
    let job_id = store.create_job(url, Operation::Map, &[], &options.page_options)?;

    match engine.map(url, options).await {
        Ok(urls) => {
            let blob = serde_json::to_value(&urls)?;
            store.update_job(&job_id, JobStatus::Completed, Some(blob), None)?;
        }
        Err(e) => {
            tracing::error!(%url, error = %e, "map job failed");
            store.update_job(&job_id, JobStatus::Failed, None, Some(e.to_string()))?;
        }
    }

    Ok(job_id)
}
