//! Crawl traversal and URL mapping

use pagesift::fetch::HttpFetcher;
use pagesift::{CrawlOptions, Engine, MapOptions, OutputFormat, PageOptions};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect();
    format!("<html><head><title>{title}</title></head><body>{anchors}</body></html>")
}

#[tokio::test]
async fn test_crawl_collects_linked_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page_with_links("root", &["/a", "/b"])).await;
    mount_page(&server, "/a", page_with_links("a", &["/c"])).await;
    mount_page(&server, "/b", page_with_links("b", &[])).await;
    mount_page(&server, "/c", page_with_links("c", &[])).await;

    let engine = Engine::new().unwrap();
    let start = format!("{}/", server.uri());
    let result = engine.crawl(&start, &CrawlOptions::default()).await.unwrap();

    let keys: Vec<&str> = result.pages.keys().map(|k| k.as_str()).collect();
    let base = server.uri();
    assert_eq!(
        keys,
        vec![
            base.clone(),
            format!("{base}/a"),
            format!("{base}/b"),
            format!("{base}/c")
        ]
    );
    assert_eq!(result.metadata.total_pages, 4);
    // Root at depth 0, /a and /b at depth 1, /c at depth 2.
    assert_eq!(result.metadata.depth_reached, 2);
    assert!(result.metadata.finished_at >= result.metadata.started_at);
}

#[tokio::test]
async fn test_crawl_depth_zero_visits_only_start_url() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page_with_links("root", &["/a"])).await;
    // /a must never be requested.
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = Engine::new().unwrap();
    let options = CrawlOptions {
        max_depth: Some(0),
        ..CrawlOptions::default()
    };
    let result = engine
        .crawl(&format!("{}/", server.uri()), &options)
        .await
        .unwrap();

    assert_eq!(result.metadata.total_pages, 1);
    assert_eq!(result.metadata.depth_reached, 0);
}

#[tokio::test]
async fn test_crawl_never_exceeds_max_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page_with_links("root", &["/p1", "/p2", "/p3", "/p4", "/p5"]),
    )
    .await;
    for page_path in ["/p1", "/p2", "/p3", "/p4", "/p5"] {
        mount_page(&server, page_path, page_with_links(page_path, &[])).await;
    }

    let engine = Engine::new().unwrap();
    let options = CrawlOptions {
        max_pages: Some(3),
        ..CrawlOptions::default()
    };
    let result = engine
        .crawl(&format!("{}/", server.uri()), &options)
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 3);
}

#[tokio::test]
async fn test_crawl_continues_past_failing_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page_with_links("root", &["/ok", "http://127.0.0.1:1/dead"]),
    )
    .await;
    mount_page(&server, "/ok", page_with_links("ok", &[])).await;

    let engine =
        Engine::with_fetcher(HttpFetcher::with_timeout(Duration::from_millis(500)).unwrap());
    let options = CrawlOptions {
        // Cross-host targets are only reachable with backwards crawling on.
        allow_backwards: true,
        page_options: PageOptions {
            max_retries: 1,
            ..PageOptions::default()
        },
        ..CrawlOptions::default()
    };
    let result = engine
        .crawl(&format!("{}/", server.uri()), &options)
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 3);
    let failed = result
        .pages
        .values()
        .find(|page| page.error.is_some())
        .expect("the dead link should be recorded with an error");
    assert!(failed.content.is_empty());
    let succeeded = result
        .pages
        .values()
        .filter(|page| page.error.is_none())
        .count();
    assert_eq!(succeeded, 2);
}

#[tokio::test]
async fn test_crawl_applies_path_rules() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page_with_links("root", &["/blog/post-1", "/about", "/assets/logo.png"]),
    )
    .await;
    mount_page(&server, "/about", page_with_links("about", &[])).await;
    // Excluded paths must never be fetched.
    Mock::given(method("GET"))
        .and(path("/blog/post-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = Engine::new().unwrap();
    let options = CrawlOptions {
        exclude_paths: vec!["/blog/*".to_string()],
        ..CrawlOptions::default()
    };
    let result = engine
        .crawl(&format!("{}/", server.uri()), &options)
        .await
        .unwrap();

    let keys: Vec<&str> = result.pages.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec![server.uri(), format!("{}/about", server.uri())]);
}

#[tokio::test]
async fn test_crawl_rejects_invalid_options() {
    let engine = Engine::new().unwrap();
    let options = CrawlOptions {
        max_pages: Some(0),
        ..CrawlOptions::default()
    };
    let result = engine.crawl("https://example.com/", &options).await;
    assert!(matches!(
        result,
        Err(pagesift::PagesiftError::Validation(_))
    ));
}

#[tokio::test]
async fn test_crawl_rejects_unparseable_start_url() {
    let engine = Engine::new().unwrap();
    let result = engine.crawl("not a url", &CrawlOptions::default()).await;
    assert!(matches!(result, Err(pagesift::PagesiftError::Url(_))));
}

#[tokio::test]
async fn test_cancelled_crawl_stops_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = Engine::new().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = engine
        .crawl_with_cancel(
            &format!("{}/", server.uri()),
            &CrawlOptions::default(),
            cancel,
        )
        .await
        .unwrap();

    assert!(result.pages.is_empty());
}

#[tokio::test]
async fn test_map_deduplicates_and_excludes_cross_domain() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/a">a</a>
            <a href="{base}/a#frag">a again</a>
            <a href="http://other.invalid/x">elsewhere</a>
            </body></html>"#
        ),
    )
    .await;

    let engine = Engine::new().unwrap();
    let urls = engine
        .map(&format!("{base}/"), &MapOptions::default())
        .await
        .unwrap();

    let urls: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
    // The fragment variant deduplicates; the cross-domain link is excluded;
    // the list is sorted and includes the start URL.
    assert_eq!(urls, vec![base.clone(), format!("{base}/a")]);
}

#[tokio::test]
async fn test_map_search_filter_and_truncation() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        page_with_links("root", &["/docs/alpha", "/docs/beta", "/pricing"]),
    )
    .await;

    let engine = Engine::new().unwrap();

    let options = MapOptions {
        search: Some("DOCS".to_string()),
        ..MapOptions::default()
    };
    let urls = engine.map(&format!("{base}/"), &options).await.unwrap();
    let urls: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
    assert_eq!(
        urls,
        vec![format!("{base}/docs/alpha"), format!("{base}/docs/beta")]
    );

    let options = MapOptions {
        max_pages: Some(2),
        ..MapOptions::default()
    };
    let urls = engine.map(&format!("{base}/"), &options).await.unwrap();
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn test_map_surfaces_fetch_failure() {
    let engine =
        Engine::with_fetcher(HttpFetcher::with_timeout(Duration::from_millis(500)).unwrap());
    let options = MapOptions {
        page_options: PageOptions {
            max_retries: 1,
            ..PageOptions::default()
        },
        ..MapOptions::default()
    };
    let result = engine.map("http://127.0.0.1:1/", &options).await;
    assert!(matches!(result, Err(pagesift::PagesiftError::Page { .. })));
}

#[tokio::test]
async fn test_crawl_result_serializes() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page_with_links("root", &[])).await;

    let engine = Engine::new().unwrap();
    let options = CrawlOptions {
        formats: vec![OutputFormat::Markdown, OutputFormat::Text],
        ..CrawlOptions::default()
    };
    let result = engine
        .crawl(&format!("{}/", server.uri()), &options)
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["metadata"]["total_pages"], 1);
    assert!(json["pages"].as_object().unwrap().len() == 1);
}
