//! Sektekomik adapter.
//!
//! Sektekomik routes by absolute URL like Shinigami, but its metadata spans
//! hold `Label: value` pairs and its synopsis and genres live under different
//! containers.

use crate::document::Document;
use crate::http_client::HttpFetcher;
use crate::models::{ComicDetail, ComicSummary, ImageSequence};
use crate::sources::themesia::{self, DetailLayout, MetadataStyle};
use crate::sources::ComicSource;
use async_trait::async_trait;
use std::sync::Arc;

pub const SOURCE_ID: &str = "sektekomik";
pub const BASE_URL: &str = "https://sektekomik.xyz";

const LATEST_ITEM: &str = "div.listupd div.utao";

const LAYOUT: DetailLayout = DetailLayout {
    synopsis: "div[itemprop='description'] p",
    genres: "div.genxed a",
    metadata: MetadataStyle::Labelled,
};

pub struct Sektekomik {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl Sektekomik {
    pub fn new(fetcher: Arc<HttpFetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ComicSource for Sektekomik {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_latest(&self) -> Vec<ComicSummary> {
        match self.fetcher.fetch(&self.base_url).await {
            Ok(html) => {
                let comics = parse_latest(&html);
                log::debug!("Sektekomik: found {} latest comics", comics.len());
                comics
            }
            Err(e) => {
                log::warn!("Sektekomik: latest list unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_detail(&self, reference: &str) -> Option<ComicDetail> {
        match self.fetcher.fetch(reference.trim()).await {
            Ok(html) => Some(themesia::parse_detail(&html, LAYOUT)),
            Err(e) => {
                log::warn!("Sektekomik: detail unavailable: {}", e);
                None
            }
        }
    }

    async fn get_chapter_images(&self, reference: &str) -> ImageSequence {
        match self.fetcher.fetch(reference.trim()).await {
            Ok(html) => themesia::parse_reader_images(&html),
            Err(e) => {
                log::warn!("Sektekomik: chapter unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

pub fn parse_latest(markup: &str) -> Vec<ComicSummary> {
    let doc = Document::parse(markup);
    doc.select_all(LATEST_ITEM)
        .iter()
        .filter_map(themesia::parse_utao_item)
        .collect()
}
