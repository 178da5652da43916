//! Site adapters.
//!
//! Each adapter hard-codes one source's markup and maps it onto the shared
//! models. Failures never escape an adapter: an unreachable page yields an
//! empty list or `None`, a malformed node is skipped.

use crate::http_client::HttpFetcher;
use crate::models::{ComicDetail, ComicSummary, ImageSequence};
use async_trait::async_trait;
use std::sync::Arc;

pub mod komikcast;
pub mod sektekomik;
pub mod shinigami;

// Shared MangaThemesia-family markup
pub mod themesia;

/// The three extraction operations every source implements.
#[async_trait]
pub trait ComicSource: Send + Sync {
    /// Registry key, e.g. `komikcast`
    fn id(&self) -> &'static str;

    fn base_url(&self) -> &str;

    /// Latest updates from the home page; empty when the page is unreachable
    async fn list_latest(&self) -> Vec<ComicSummary>;

    /// Series detail; `None` when the page is unreachable
    async fn get_detail(&self, reference: &str) -> Option<ComicDetail>;

    /// Page images of a chapter; empty when the page is unreachable
    async fn get_chapter_images(&self, reference: &str) -> ImageSequence;
}

/// Every source the registry knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Komikcast,
    Shinigami,
    Sektekomik,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Komikcast, Source::Shinigami, Source::Sektekomik];

    pub fn id(self) -> &'static str {
        match self {
            Source::Komikcast => komikcast::SOURCE_ID,
            Source::Shinigami => shinigami::SOURCE_ID,
            Source::Sektekomik => sektekomik::SOURCE_ID,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Source::Komikcast => komikcast::BASE_URL,
            Source::Shinigami => shinigami::BASE_URL,
            Source::Sektekomik => sektekomik::BASE_URL,
        }
    }

    pub fn parse(s: &str) -> Option<Source> {
        let k = s.trim().to_lowercase();
        Source::ALL.into_iter().find(|src| src.id() == k)
    }

    /// Build the adapter for this source against `base_url`
    pub fn build(self, fetcher: Arc<HttpFetcher>, base_url: &str) -> Arc<dyn ComicSource> {
        match self {
            Source::Komikcast => Arc::new(komikcast::Komikcast::new(fetcher, base_url)),
            Source::Shinigami => Arc::new(shinigami::Shinigami::new(fetcher, base_url)),
            Source::Sektekomik => Arc::new(sektekomik::Sektekomik::new(fetcher, base_url)),
        }
    }
}
