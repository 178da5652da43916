//! Shinigami adapter.
//!
//! Shinigami routes by absolute URL: listing identifiers, the `get_detail`
//! reference and the `get_chapter_images` reference are all full page URLs,
//! fetched as given. Metadata spans alternate key and value.

use crate::document::Document;
use crate::http_client::HttpFetcher;
use crate::models::{ComicDetail, ComicSummary, ImageSequence};
use crate::sources::themesia::{self, DetailLayout, MetadataStyle};
use crate::sources::ComicSource;
use async_trait::async_trait;
use std::sync::Arc;

pub const SOURCE_ID: &str = "shinigami";
pub const BASE_URL: &str = "https://shinigamitoon.com";

/// Home page section whose heading reads "Project"
const PROJECT_SECTION: &str = "div.bixbox";
const SECTION_HEADING: &str = "h3 span";
const SECTION_LABEL: &str = "Project";
const LATEST_ITEM: &str = "div.utao";

const LAYOUT: DetailLayout = DetailLayout {
    synopsis: "div.entry-content",
    genres: "span.mgen a",
    metadata: MetadataStyle::Positional,
};

pub struct Shinigami {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl Shinigami {
    pub fn new(fetcher: Arc<HttpFetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ComicSource for Shinigami {
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
                log::debug!("Shinigami: found {} project updates", comics.len());
                comics
            }
            Err(e) => {
                log::warn!("Shinigami: latest list unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_detail(&self, reference: &str) -> Option<ComicDetail> {
        match self.fetcher.fetch(reference.trim()).await {
            Ok(html) => Some(themesia::parse_detail(&html, LAYOUT)),
            Err(e) => {
                log::warn!("Shinigami: detail unavailable: {}", e);
                None
            }
        }
    }

    async fn get_chapter_images(&self, reference: &str) -> ImageSequence {
        match self.fetcher.fetch(reference.trim()).await {
            Ok(html) => themesia::parse_reader_images(&html),
            Err(e) => {
                log::warn!("Shinigami: chapter unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

/// Cards of the "Project" section, in page order
pub fn parse_latest(markup: &str) -> Vec<ComicSummary> {
    let doc = Document::parse(markup);

    let mut cards = Vec::new();
    for section in doc.select_all(PROJECT_SECTION) {
        let is_project = section
            .select_all(SECTION_HEADING)
            .iter()
            .any(|span| span.text() == SECTION_LABEL);
        if !is_project {
            continue;
        }
        for card in section.select_all(LATEST_ITEM) {
            // Nested sections would otherwise yield the same card twice
            if !cards.contains(&card) {
                cards.push(card);
            }
        }
    }

    cards.iter().filter_map(themesia::parse_utao_item).collect()
}
