//! Job tracking around engine operations

use pagesift::jobs::{run_batch_job, run_crawl_job, run_map_job, run_scrape_job};
use pagesift::{
    CrawlOptions, Engine, JobStatus, JobStore, MapOptions, Operation, OutputFormat, PageOptions,
    SqliteJobStore,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn single_page_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    "<html><head><title>Tracked</title></head><body><p>body</p></body></html>",
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_scrape_job_completes_with_result_blob() {
    let server = single_page_server().await;
    let engine = Engine::new().unwrap();
    let store = SqliteJobStore::in_memory().unwrap();

    let job_id = run_scrape_job(
        &engine,
        &store,
        &format!("{}/", server.uri()),
        &[OutputFormat::Markdown],
        &PageOptions::default(),
    )
    .await
    .unwrap();

    let record = store.get_job_status(&job_id).unwrap().unwrap();
    assert_eq!(record.operation, Operation::Scrape);
    assert_eq!(record.status, JobStatus::Completed);
    assert!(record.completed_at.is_some());
    let result = record.result.unwrap();
    assert_eq!(result["metadata"]["title"], "Tracked");
}

#[tokio::test]
async fn test_crawl_job_fails_on_invalid_options() {
    let engine = Engine::new().unwrap();
    let store = SqliteJobStore::in_memory().unwrap();
    let options = CrawlOptions {
        max_pages: Some(0),
        ..CrawlOptions::default()
    };

    let job_id = run_crawl_job(&engine, &store, "https://example.com/", &options)
        .await
        .unwrap();

    let record = store.get_job_status(&job_id).unwrap().unwrap();
    assert_eq!(record.operation, Operation::Crawl);
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.unwrap().contains("max_pages"));
    assert!(record.result.is_none());
}

#[tokio::test]
async fn test_crawl_job_completes() {
    let server = single_page_server().await;
    let engine = Engine::new().unwrap();
    let store = SqliteJobStore::in_memory().unwrap();

    let job_id = run_crawl_job(
        &engine,
        &store,
        &format!("{}/", server.uri()),
        &CrawlOptions::default(),
    )
    .await
    .unwrap();

    let record = store.get_job_status(&job_id).unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Completed);
    let result = record.result.unwrap();
    assert_eq!(result["metadata"]["total_pages"], 1);
}

#[tokio::test]
async fn test_batch_job_records_every_url() {
    let server = single_page_server().await;
    let engine = Engine::new().unwrap();
    let store = SqliteJobStore::in_memory().unwrap();
    let urls = vec![
        format!("{}/one", server.uri()),
        format!("{}/two", server.uri()),
    ];

    let job_id = run_batch_job(
        &engine,
        &store,
        &urls,
        &[OutputFormat::Text],
        &PageOptions::default(),
        2,
    )
    .await
    .unwrap();

    let record = store.get_job_status(&job_id).unwrap().unwrap();
    assert_eq!(record.operation, Operation::Batch);
    assert_eq!(record.status, JobStatus::Completed);
    let result = record.result.unwrap();
    assert_eq!(result.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_map_job_completes_with_url_list() {
    let server = single_page_server().await;
    let engine = Engine::new().unwrap();
    let store = SqliteJobStore::in_memory().unwrap();

    let job_id = run_map_job(
        &engine,
        &store,
        &format!("{}/", server.uri()),
        &MapOptions::default(),
    )
    .await
    .unwrap();

    let record = store.get_job_status(&job_id).unwrap().unwrap();
    assert_eq!(record.operation, Operation::Map);
    assert_eq!(record.status, JobStatus::Completed);
    let urls = record.result.unwrap();
    assert_eq!(urls.as_array().unwrap().len(), 1);
}
