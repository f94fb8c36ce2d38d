//! SQLite-backed job store

use crate::jobs::{JobRecord, JobStatus, JobStore, Operation, StoreError};
use crate::options::{OutputFormat, PageOptions};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite job store
///
/// The connection is serialized behind a mutex; the store is shared by
/// reference across tasks.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Opens (or creates) a job database at the given path
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            operation TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            completed_at TEXT,
            error TEXT,
            formats TEXT NOT NULL,
            page_options TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS job_results (
            job_id TEXT PRIMARY KEY REFERENCES jobs(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            result TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
    ",
    )
}

impl JobStore for SqliteJobStore {
    fn create_job(
        &self,
        url: &str,
        operation: Operation,
        formats: &[OutputFormat],
        page_options: &PageOptions,
    ) -> Result<String, StoreError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        let formats_json = serde_json::to_string(formats)?;
        let page_options_json = serde_json::to_string(page_options)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO jobs (id, url, operation, status, created_at, formats, page_options)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                job_id,
                url,
                operation.as_str(),
                JobStatus::Pending.as_str(),
                created_at,
                formats_json,
                page_options_json,
            ],
        )?;

        Ok(job_id)
    }

    fn update_job(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let url: Option<String> = conn
            .query_row(
                "SELECT url FROM jobs WHERE id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()?;
        // Unknown ids are a silent no-op.
        let Some(url) = url else {
            return Ok(());
        };

        let completed_at = match status {
            JobStatus::Completed | JobStatus::Failed => Some(Utc::now().to_rfc3339()),
            JobStatus::Pending => None,
        };
        conn.execute(
            "UPDATE jobs SET status = ?1, completed_at = ?2, error = ?3 WHERE id = ?4",
            params![status.as_str(), completed_at, error, job_id],
        )?;

        // A failed job keeps no stale result; a new result replaces any
        // prior one.
        conn.execute(
            "DELETE FROM job_results WHERE job_id = ?1",
            params![job_id],
        )?;
        if status == JobStatus::Completed {
            if let Some(result) = result {
                let blob = serde_json::to_string(&result)?;
                conn.execute(
                    "INSERT INTO job_results (job_id, url, result) VALUES (?1, ?2, ?3)",
                    params![job_id, url, blob],
                )?;
            }
        }

        Ok(())
    }

    fn get_job_status(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, String, String, Option<String>, Option<String>)> =
            conn.query_row(
                "SELECT id, url, operation, status, created_at, completed_at, error
                 FROM jobs WHERE id = ?1",
                params![job_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, url, operation, status, created_at, completed_at, error)) = row else {
            return Ok(None);
        };

        let status = JobStatus::from_db_string(&status).unwrap_or(JobStatus::Pending);
        let mut record = JobRecord {
            id,
            url,
            operation: Operation::from_db_string(&operation).unwrap_or(Operation::Scrape),
            status,
            created_at: parse_timestamp(&created_at)?,
            completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
            error,
            result: None,
        };

        if status == JobStatus::Completed {
            let blob: Option<String> = conn
                .query_row(
                    "SELECT result FROM job_results WHERE job_id = ?1",
                    params![job_id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(blob) = blob {
                record.result = Some(serde_json::from_str(&blob)?);
            }
        }

        Ok(Some(record))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(raw.to_string()))
}
