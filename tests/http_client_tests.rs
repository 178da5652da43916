use rust_comic_scraper::error::FetchError;
use rust_comic_scraper::http_client::{HttpClientConfig, HttpFetcher, DEFAULT_USER_AGENT};
use std::time::Duration;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_fetcher(max_retries: usize) -> HttpFetcher {
    HttpFetcher::with_config(HttpClientConfig {
        timeout: Duration::from_secs(5),
        max_retries,
        initial_retry_delay_ms: 10,
        max_retry_delay_ms: 50,
        ..HttpClientConfig::default()
    })
    .expect("Failed to create fetcher")
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"))
        .mount(&mock_server)
        .await;

    let body = fast_fetcher(0).fetch(&mock_server.uri()).await.unwrap();
    assert!(body.contains("ok"));
}

#[tokio::test]
async fn test_fetch_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_regex("user-agent", r"^Mozilla/5\.0 .*Chrome/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("identified"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fast_fetcher(0).fetch(&mock_server.uri()).await.unwrap();
    assert_eq!(body, "identified");

    let requests = mock_server.received_requests().await.unwrap();
    let sent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok());
    assert_eq!(sent, Some(DEFAULT_USER_AGENT));
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new/", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&mock_server)
        .await;

    let body = fast_fetcher(0)
        .fetch(&format!("{}/old/", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "moved here");
}

#[tokio::test]
async fn test_fetch_retries_transient_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let body = fast_fetcher(2).fetch(&mock_server.uri()).await.unwrap();
    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fast_fetcher(2).fetch(&mock_server.uri()).await;
    assert!(matches!(result, Err(FetchError::Status { status: 502, .. })));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fast_fetcher(2).fetch(&mock_server.uri()).await;
    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::with_config(HttpClientConfig {
        timeout: Duration::from_millis(200),
        max_retries: 0,
        ..HttpClientConfig::default()
    })
    .unwrap();

    let result = fetcher.fetch(&mock_server.uri()).await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}
