//! Komikcast adapter.
//!
//! Komikcast routes by slug: listing identifiers are series slugs
//! (`one-piece`), `get_detail` takes that slug and `get_chapter_images` takes a
//! chapter slug (`one-piece-chapter-1120`), both rebuilt against the base URL.
//! Chapter rows carry their slug so the caller can feed it back.

use crate::document::{Document, Node};
use crate::helpers::{last_path_segment, url_path};
use crate::http_client::HttpFetcher;
use crate::models::{ChapterRef, ComicDetail, ComicSummary, ImageSequence};
use crate::sources::themesia::{self, Metadata, MetadataStyle, NO_SYNOPSIS, UNTITLED};
use crate::sources::ComicSource;
use async_trait::async_trait;
use std::sync::Arc;

pub const SOURCE_ID: &str = "komikcast";
pub const BASE_URL: &str = "https://komikcast.lol";

const LATEST_ITEM: &str = "div.list-update_item";
const LATEST_TITLE: &str = "h3.list-update_item-title";
const LATEST_THUMBNAIL: &str = "img.list-update_item-img-in";

const DETAIL_TITLE: &str = "h1.komik_info-content-body-title";
const DETAIL_COVER: &str = "div.komik_info-content-thumbnail img";
const DETAIL_SYNOPSIS: &str = "div.komik_info-description-sinopsis";
const DETAIL_META: &str = "div.komik_info-content-meta span";
const DETAIL_GENRES: &str = ".komik_info-content-genre a";
const CHAPTER_ITEM: &str = "div.clstyle li";

pub struct Komikcast {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl Komikcast {
    pub fn new(fetcher: Arc<HttpFetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn series_url(&self, slug: &str) -> String {
        format!("{}/komik/{}/", self.base_url, slug.trim().trim_matches('/'))
    }

    fn chapter_url(&self, slug: &str) -> String {
        format!("{}/{}/", self.base_url, slug.trim().trim_matches('/'))
    }
}

#[async_trait]
impl ComicSource for Komikcast {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_latest(&self) -> Vec<ComicSummary> {
        match self.fetcher.fetch(&self.base_url).await {
            Ok(html) => {
                let comics = parse_latest(&html, &self.base_url);
                log::debug!("Komikcast: found {} latest comics", comics.len());
                comics
            }
            Err(e) => {
                log::warn!("Komikcast: latest list unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_detail(&self, reference: &str) -> Option<ComicDetail> {
        let url = self.series_url(reference);
        match self.fetcher.fetch(&url).await {
            Ok(html) => Some(parse_detail(&html, &self.base_url)),
            Err(e) => {
                log::warn!("Komikcast: detail for '{}' unavailable: {}", reference, e);
                None
            }
        }
    }

    async fn get_chapter_images(&self, reference: &str) -> ImageSequence {
        let url = self.chapter_url(reference);
        match self.fetcher.fetch(&url).await {
            Ok(html) => themesia::parse_reader_images(&html),
            Err(e) => {
                log::warn!("Komikcast: chapter '{}' unavailable: {}", reference, e);
                Vec::new()
            }
        }
    }
}

/// Series slug from a `/komik/<slug>/` link
fn series_slug(link: &str, base_url: &str) -> Option<String> {
    let path = url_path(link, base_url)?;
    let path = path.trim_end_matches('/');
    let slug = path
        .strip_prefix("/komik/")
        .unwrap_or_else(|| path.trim_start_matches('/'));
    (!slug.is_empty()).then(|| slug.to_string())
}

fn parse_latest_item(node: &Node<'_>, base_url: &str) -> Option<ComicSummary> {
    let link = node.attr_at("a", "href")?;
    let identifier = series_slug(&link, base_url)?;
    let title = node
        .text_at(LATEST_TITLE)
        .unwrap_or_else(|| UNTITLED.to_string());
    let thumbnail_url = node.attr_at(LATEST_THUMBNAIL, "src").unwrap_or_default();

    Some(ComicSummary {
        title,
        thumbnail_url,
        identifier,
    })
}

pub fn parse_latest(markup: &str, base_url: &str) -> Vec<ComicSummary> {
    let doc = Document::parse(markup);
    doc.select_all(LATEST_ITEM)
        .iter()
        .filter_map(|node| parse_latest_item(node, base_url))
        .collect()
}

fn parse_chapter_item(node: &Node<'_>, base_url: &str) -> Option<ChapterRef> {
    let url = node.attr_at("a", "href").filter(|u| !u.is_empty())?;
    let slug = last_path_segment(&url, base_url)?;
    let (title, published_label) = themesia::chapter_labels(node);
    Some(ChapterRef {
        title,
        url,
        published_label,
        slug: Some(slug),
    })
}

pub fn parse_detail(markup: &str, base_url: &str) -> ComicDetail {
    let doc = Document::parse(markup);

    let title = doc
        .text(DETAIL_TITLE)
        .unwrap_or_else(|| UNTITLED.to_string());
    let cover_image_url = doc.attr(DETAIL_COVER, "src").unwrap_or_default();
    let synopsis = doc
        .text(DETAIL_SYNOPSIS)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SYNOPSIS.to_string());
    let metadata = Metadata::read(&doc.select_all(DETAIL_META), MetadataStyle::Labelled);
    let genres = doc
        .select_all(DETAIL_GENRES)
        .iter()
        .map(|n| n.text())
        .filter(|g| !g.is_empty())
        .collect();
    let chapters = doc
        .select_all(CHAPTER_ITEM)
        .iter()
        .filter_map(|node| parse_chapter_item(node, base_url))
        .collect();

    ComicDetail {
        title,
        cover_image_url,
        author: metadata.get_or_na("author"),
        status: metadata.get_or_na("status"),
        genres,
        synopsis,
        chapters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = r#"
        <div class="list-update_items-wrapper">
          <div class="list-update_item">
            <a href="https://komikcast.lol/komik/one-piece/">
              <img class="list-update_item-img-in" src="https://cdn.komikcast.lol/one-piece.jpg">
              <h3 class="list-update_item-title">One Piece</h3>
            </a>
          </div>
          <div class="list-update_item">
            <img class="list-update_item-img-in" src="https://cdn.komikcast.lol/broken.jpg">
            <h3 class="list-update_item-title">No Link</h3>
          </div>
          <div class="list-update_item">
            <a href="/komik/solo-leveling/"><h3 class="list-update_item-title">Solo Leveling</h3></a>
          </div>
        </div>
    "#;

    const SERIES: &str = r#"
        <div class="komik_info">
          <div class="komik_info-content-thumbnail"><img src="https://cdn.komikcast.lol/op.jpg"></div>
          <h1 class="komik_info-content-body-title">One Piece</h1>
          <span class="komik_info-content-genre">
            <a class="genre-item">Action</a><a class="genre-item">Adventure</a>
          </span>
          <div class="komik_info-content-meta">
            <span class="komik_info-content-info"><b>Released:</b> 1997</span>
            <span class="komik_info-content-info"><b>Author:</b> Oda Eiichiro</span>
            <span class="komik_info-content-info"><b>Status:</b> Ongoing</span>
          </div>
          <div class="komik_info-description-sinopsis"><p>Pirates.</p></div>
          <div class="clstyle"><ul>
            <li><a href="https://komikcast.lol/chapter/one-piece-chapter-1120/"><span class="chapternum">Chapter 1120</span></a><span class="chapterdate">2 days ago</span></li>
            <li><a href="https://komikcast.lol/"><span class="chapternum">Home</span></a></li>
            <li><a href="https://komikcast.lol/chapter/one-piece-chapter-1119/"><span class="chapternum">Chapter 1119</span></a></li>
          </ul></div>
        </div>
    "#;

    #[test]
    fn test_parse_latest_extracts_slugs() {
        let comics = parse_latest(HOME, BASE_URL);
        assert_eq!(comics.len(), 2);
        assert_eq!(comics[0].identifier, "one-piece");
        assert_eq!(comics[0].title, "One Piece");
        assert_eq!(comics[0].thumbnail_url, "https://cdn.komikcast.lol/one-piece.jpg");
        assert_eq!(comics[1].identifier, "solo-leveling");
        assert_eq!(comics[1].thumbnail_url, "");
    }

    #[test]
    fn test_parse_detail() {
        let detail = parse_detail(SERIES, BASE_URL);
        assert_eq!(detail.title, "One Piece");
        assert_eq!(detail.cover_image_url, "https://cdn.komikcast.lol/op.jpg");
        assert_eq!(detail.author, "Oda Eiichiro");
        assert_eq!(detail.status, "Ongoing");
        assert_eq!(detail.genres, vec!["Action", "Adventure"]);
        assert_eq!(detail.synopsis, "Pirates.");

        // Home link has no chapter slug and is dropped
        assert_eq!(detail.chapters.len(), 2);
        assert_eq!(detail.chapters[0].title, "Chapter 1120");
        assert_eq!(detail.chapters[0].published_label, "2 days ago");
        assert_eq!(detail.chapters[0].slug.as_deref(), Some("one-piece-chapter-1120"));
        assert_eq!(detail.chapters[1].published_label, "N/A");
    }

    #[test]
    fn test_parse_detail_of_empty_page_uses_defaults() {
        let detail = parse_detail("<html><body></body></html>", BASE_URL);
        assert_eq!(detail.title, UNTITLED);
        assert_eq!(detail.author, "N/A");
        assert_eq!(detail.status, "N/A");
        assert_eq!(detail.synopsis, NO_SYNOPSIS);
        assert!(detail.genres.is_empty());
        assert!(detail.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_urls_follow_slug_routing() {
        let fetcher = Arc::new(HttpFetcher::new().unwrap());
        let source = Komikcast::new(fetcher, "https://komikcast.lol/");
        assert_eq!(source.series_url("one-piece"), "https://komikcast.lol/komik/one-piece/");
        assert_eq!(source.series_url("/one-piece/"), "https://komikcast.lol/komik/one-piece/");
        assert_eq!(
            source.chapter_url("one-piece-chapter-1120"),
            "https://komikcast.lol/one-piece-chapter-1120/"
        );
    }
}
