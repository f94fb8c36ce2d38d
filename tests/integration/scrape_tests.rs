//! Single-page scraping and batch coordination

use pagesift::fetch::HttpFetcher;
use pagesift::{Engine, OutputFormat, PageOptions};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALL_FORMATS: &[OutputFormat] = &[
    OutputFormat::Markdown,
    OutputFormat::Text,
    OutputFormat::Html,
];

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_scrape_extracts_content_metadata_and_links() {
    let server = MockServer::start().await;
    let body = r#"<html lang="en-US"><head>
        <title>Example Article</title>
        <meta name="description" content="An example page.">
        <meta property="og:type" content="article">
        </head><body>
        <h1>Example Article</h1>
        <p>Some <b>bold</b> prose.</p>
        <a href="/next" rel="nofollow">Next page</a>
        </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html_response(body))
        .mount(&server)
        .await;

    let engine = Engine::new().unwrap();
    let options = PageOptions {
        include_links: true,
        ..PageOptions::default()
    };
    let url = format!("{}/article", server.uri());
    let page = engine.scrape(&url, ALL_FORMATS, &options).await;

    assert!(page.error.is_none(), "unexpected error: {:?}", page.error);
    assert_eq!(page.metadata.title, "Example Article");
    assert_eq!(page.metadata.description, "An example page.");
    assert_eq!(page.metadata.language, "en-us");
    assert_eq!(page.metadata.page_type, "article");
    assert_eq!(page.metadata.http_status, Some(200));
    assert_eq!(page.metadata.source_url, url);

    let markdown = &page.content[&OutputFormat::Markdown];
    assert!(markdown.contains("# Example Article"));
    assert!(markdown.contains("**bold**"));
    assert!(page.content[&OutputFormat::Html].contains("<h1>"));

    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].url, format!("{}/next", server.uri()));
    assert!(page.links[0].nofollow);
}

#[tokio::test]
async fn test_scrape_passes_http_errors_through_as_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><body><p>Not here.</p></body></html>"),
        )
        .mount(&server)
        .await;

    let engine = Engine::new().unwrap();
    let page = engine
        .scrape(
            &format!("{}/gone", server.uri()),
            &[OutputFormat::Text],
            &PageOptions::default(),
        )
        .await;

    // A 4xx is not a transport failure: the fetch succeeds and the status
    // is recorded on the page.
    assert!(page.error.is_none());
    assert_eq!(page.metadata.http_status, Some(404));
    assert_eq!(page.content[&OutputFormat::Text], "Not here.");
}

#[tokio::test]
async fn test_scrape_records_error_for_unreachable_host() {
    let engine = Engine::with_fetcher(HttpFetcher::with_timeout(Duration::from_millis(500)).unwrap());
    let options = PageOptions {
        max_retries: 1,
        ..PageOptions::default()
    };
    let page = engine
        .scrape("http://127.0.0.1:1/", &[OutputFormat::Markdown], &options)
        .await;

    assert!(page.error.is_some());
    assert!(page.content.is_empty());
    assert!(page.metadata.http_status.is_none());
}

#[tokio::test]
async fn test_direct_fetch_retries_timeouts_with_backoff() {
    let server = MockServer::start().await;

    // The first two requests stall past the client timeout; the third
    // answers immediately.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(
            html_response("<html><body>slow</body></html>")
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_response("<html><body><p>recovered</p></body></html>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_timeout(Duration::from_millis(200)).unwrap();
    let started = Instant::now();
    let fetched = fetcher
        .fetch(&format!("{}/flaky", server.uri()), 3, None)
        .await
        .expect("third attempt should succeed");
    let elapsed = started.elapsed();

    assert!(fetched.content.contains("recovered"));
    assert_eq!(fetched.status, 200);
    // Exponential backoff slept 1s after the first failure and 2s after
    // the second.
    assert!(
        elapsed >= Duration::from_secs(3),
        "expected backoff of at least 3s, elapsed {elapsed:?}"
    );
}

#[tokio::test]
async fn test_retries_exhausted_is_an_error() {
    let fetcher = HttpFetcher::with_timeout(Duration::from_millis(300)).unwrap();
    let result = fetcher.fetch("http://127.0.0.1:1/", 2, None).await;
    assert!(matches!(
        result,
        Err(pagesift::FetchError::RetriesExhausted { attempts: 2, .. })
    ));
}

#[tokio::test]
async fn test_batch_isolates_failing_urls() {
    let server = MockServer::start().await;
    for page_path in ["/p1", "/p2", "/p3", "/p4"] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html_response(&format!(
                "<html><body><p>page {page_path}</p></body></html>"
            )))
            .mount(&server)
            .await;
    }

    let mut urls: Vec<String> = ["/p1", "/p2", "/p3", "/p4"]
        .iter()
        .map(|page_path| format!("{}{page_path}", server.uri()))
        .collect();
    urls.push("http://127.0.0.1:1/unreachable".to_string());

    let engine = Engine::with_fetcher(HttpFetcher::with_timeout(Duration::from_millis(500)).unwrap());
    let options = PageOptions {
        max_retries: 1,
        ..PageOptions::default()
    };
    let results = engine
        .scrape_batch(&urls, &[OutputFormat::Text], &options, 3)
        .await;

    assert_eq!(results.len(), 5);
    for url in &urls[..4] {
        let page = &results[url];
        assert!(page.error.is_none(), "{url} should succeed");
        assert!(!page.content.is_empty());
    }
    let failed = &results["http://127.0.0.1:1/unreachable"];
    assert!(failed.error.is_some());
    assert!(failed.content.is_empty());
}

#[tokio::test]
async fn test_batch_preserves_original_url_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response("<html><body>ok</body></html>"))
        .mount(&server)
        .await;

    // Trailing slash and fragment variants stay distinct keys; batch
    // results are keyed by the caller's strings, not normalized forms.
    let urls = vec![
        format!("{}/page/", server.uri()),
        format!("{}/page#frag", server.uri()),
    ];
    let engine = Engine::new().unwrap();
    let results = engine
        .scrape_batch(&urls, &[OutputFormat::Text], &PageOptions::default(), 2)
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.contains_key(&urls[0]));
    assert!(results.contains_key(&urls[1]));
}
