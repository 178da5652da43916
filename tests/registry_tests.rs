//! Dispatch through the registry and the response envelope.

use async_trait::async_trait;
use rust_comic_scraper::config::Config;
use rust_comic_scraper::models::{ComicDetail, ComicSummary, ImageSequence};
use rust_comic_scraper::registry::{Operation, Payload, Registry};
use rust_comic_scraper::response::{respond, Outcome};
use rust_comic_scraper::sources::ComicSource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Adapter that panics on every operation
struct Exploding;

#[async_trait]
impl ComicSource for Exploding {
    fn id(&self) -> &'static str {
        "exploding"
    }

    fn base_url(&self) -> &str {
        "http://exploding.invalid"
    }

    async fn list_latest(&self) -> Vec<ComicSummary> {
        panic!("selector blew up")
    }

    async fn get_detail(&self, _reference: &str) -> Option<ComicDetail> {
        panic!("selector blew up")
    }

    async fn get_chapter_images(&self, _reference: &str) -> ImageSequence {
        panic!("selector blew up")
    }
}

/// Adapter that records how many operations overlap
#[derive(Default)]
struct Slow {
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl ComicSource for Slow {
    fn id(&self) -> &'static str {
        "slow"
    }

    fn base_url(&self) -> &str {
        "http://slow.invalid"
    }

    async fn list_latest(&self) -> Vec<ComicSummary> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        Vec::new()
    }

    async fn get_detail(&self, _reference: &str) -> Option<ComicDetail> {
        None
    }

    async fn get_chapter_images(&self, _reference: &str) -> ImageSequence {
        Vec::new()
    }
}

fn config_for(base_url: &str) -> Config {
    Config::from_toml(&format!(
        r#"
        [http]
        timeout_secs = 20
        max_retries = 0

        [sources.komikcast]
        base_url = "{base_url}"

        [sources.sektekomik]
        base_url = "{base_url}"
        "#
    ))
    .expect("valid config")
}

#[tokio::test]
async fn test_panicking_adapter_yields_empty_payload() {
    let registry = Registry::with_adapters(vec![Arc::new(Exploding) as Arc<dyn ComicSource>], 4);

    for operation in [
        Operation::ListLatest,
        Operation::GetDetail,
        Operation::GetChapterImages,
    ] {
        let payload = registry
            .invoke("exploding", operation, Some("anything"))
            .await
            .expect("panic is not a caller error");
        assert_eq!(payload, Payload::empty(operation));
    }

    let metrics = registry.metrics().get_metrics("exploding").unwrap();
    assert_eq!(metrics.faults, 3);
    assert_eq!(metrics.successful_requests, 0);
    assert!(metrics.last_error.is_some());
}

#[tokio::test]
async fn test_panic_in_one_source_leaves_others_working() {
    let slow = Arc::new(Slow::default());
    let registry = Registry::with_adapters(
        vec![
            Arc::new(Exploding) as Arc<dyn ComicSource>,
            slow.clone() as Arc<dyn ComicSource>,
        ],
        4,
    );

    let (exploded, fine) = tokio::join!(
        registry.invoke("exploding", Operation::ListLatest, None),
        registry.invoke("slow", Operation::ListLatest, None),
    );
    assert_eq!(exploded, Ok(Payload::Comics(Vec::new())));
    assert_eq!(fine, Ok(Payload::Comics(Vec::new())));
    assert_eq!(registry.metrics().get_metrics("slow").unwrap().faults, 0);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let slow = Arc::new(Slow::default());
    let registry = Arc::new(Registry::with_adapters(vec![slow.clone() as Arc<dyn ComicSource>], 2));

    let mut set = JoinSet::new();
    for _ in 0..6 {
        let registry = registry.clone();
        set.spawn(async move { registry.invoke("slow", Operation::ListLatest, None).await });
    }
    while let Some(result) = set.join_next().await {
        assert!(result.unwrap().is_ok());
    }

    let peak = slow.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak concurrency was {}", peak);
}

#[tokio::test]
async fn test_abandoned_calls_keep_their_permit() {
    let slow = Arc::new(Slow::default());
    let registry = Registry::with_adapters(vec![slow.clone() as Arc<dyn ComicSource>], 1);

    // Each caller gives up long before the adapter finishes
    for _ in 0..4 {
        let result = tokio::time::timeout(
            Duration::from_millis(5),
            registry.invoke("slow", Operation::ListLatest, None),
        )
        .await;
        assert!(result.is_err());
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let peak = slow.peak.load(Ordering::SeqCst);
    assert_eq!(peak, 1, "peak concurrency was {}", peak);
}

#[tokio::test]
async fn test_respond_end_to_end() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="listupd">
                 <div class="utao"><a href="https://sektekomik.xyz/manga/a/"><img src="https://cdn/a.jpg"><h4>A</h4></a></div>
               </div>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/komik/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let registry = Registry::from_config(&config_for(&mock_server.uri())).unwrap();

    let env = respond(&registry, Some("sektekomik"), Some("latest"), None).await;
    assert_eq!(env.outcome, Outcome::Success);
    assert_eq!(env.source_id.as_deref(), Some("sektekomik"));
    match env.data {
        Some(Payload::Comics(comics)) => assert_eq!(comics.len(), 1),
        other => panic!("expected comics, got {:?}", other),
    }

    let env = respond(&registry, Some("komikcast"), Some("detail"), Some("missing")).await;
    assert_eq!(env.outcome, Outcome::NotFound);
    assert_eq!(env.outcome.http_status(), 404);

    let env = respond(&registry, Some("kiryuu"), Some("latest"), None).await;
    assert_eq!(env.outcome, Outcome::UnsupportedSource);
    assert!(env.data.is_none());

    let metrics = registry.metrics().get_metrics("sektekomik").unwrap();
    assert_eq!(metrics.successful_requests, 1);
    let metrics = registry.metrics().get_metrics("komikcast").unwrap();
    assert_eq!(metrics.empty_results, 1);
}
