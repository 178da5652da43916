//! Markup shared by MangaThemesia-based sources (Shinigami, Sektekomik and, for
//! chapter rows and the reader, Komikcast).
//!
//! Per-site differences such as the listing container, synopsis path, genre
//! path and metadata style are passed in by the site modules.

use crate::document::{Document, Node};
use crate::helpers::{absolute_urls, collapse_whitespace, normalize_key};
use crate::models::{ChapterRef, ComicDetail, ComicSummary, ImageSequence, NOT_AVAILABLE};
use std::collections::HashMap;

pub const UNTITLED: &str = "Untitled";
pub const NO_SYNOPSIS: &str = "No synopsis available.";

/// Images inside the reader container
pub const READER_IMAGES: &str = "div#readerarea img";

const DETAIL_TITLE: &str = "h1.entry-title";
const DETAIL_COVER: &str = "div.thumb img";
const DETAIL_META: &str = "div.spe > span";
const CHAPTER_ITEM: &str = "div#chapterlist li";
const CHAPTER_NUMBER: &str = "span.chapternum";
const CHAPTER_DATE: &str = "span.chapterdate";

/// How a source lays out the `key: value` metadata spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStyle {
    /// Alternating key and value spans
    Positional,
    /// One span per pair, split at the first colon
    Labelled,
}

/// Metadata block keyed by lowercased label
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata(HashMap<String, String>);

impl Metadata {
    pub fn read(nodes: &[Node<'_>], style: MetadataStyle) -> Self {
        match style {
            MetadataStyle::Positional => Self::positional(nodes),
            MetadataStyle::Labelled => Self::labelled(nodes),
        }
    }

    pub fn positional(nodes: &[Node<'_>]) -> Self {
        let mut fields = HashMap::new();
        for pair in nodes.chunks(2) {
            if let [key, value] = pair {
                fields.insert(normalize_key(&key.text()), collapse_whitespace(&value.text()));
            }
        }
        Metadata(fields)
    }

    pub fn labelled(nodes: &[Node<'_>]) -> Self {
        let mut fields = HashMap::new();
        for node in nodes {
            let text = node.text();
            if let Some((key, value)) = text.split_once(':') {
                fields.insert(key.trim().to_lowercase(), collapse_whitespace(value));
            }
        }
        Metadata(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Value for `key`, or "N/A" when missing or blank
    pub fn get_or_na(&self, key: &str) -> String {
        self.get(key).unwrap_or(NOT_AVAILABLE).to_string()
    }
}

/// Paths that differ between MangaThemesia sites on the series page
#[derive(Debug, Clone, Copy)]
pub struct DetailLayout {
    pub synopsis: &'static str,
    pub genres: &'static str,
    pub metadata: MetadataStyle,
}

/// A `div.utao` card: first link, `h4` title, first image.
///
/// The card is dropped when its link, title or thumbnail is empty.
pub fn parse_utao_item(node: &Node<'_>) -> Option<ComicSummary> {
    let identifier = node
        .select_first("a")
        .and_then(|a| a.attr("href"))
        .unwrap_or_default();
    let title = node.text_at("h4").unwrap_or_else(|| UNTITLED.to_string());
    let thumbnail_url = node.attr_at("img", "src").unwrap_or_default();

    if identifier.is_empty() || title.is_empty() || thumbnail_url.is_empty() {
        log::debug!("Skipping listing card without link, title or thumbnail");
        return None;
    }

    Some(ComicSummary {
        title,
        thumbnail_url,
        identifier,
    })
}

/// Chapter number and release date of a chapter row, "N/A" when absent
pub fn chapter_labels(node: &Node<'_>) -> (String, String) {
    let title = node
        .text_at(CHAPTER_NUMBER)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let published_label = node
        .text_at(CHAPTER_DATE)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    (title, published_label)
}

/// A `div#chapterlist li` row; rows without a link are skipped
pub fn parse_chapter_item(node: &Node<'_>) -> Option<ChapterRef> {
    let url = node
        .select_first("a")
        .and_then(|a| a.attr("href"))
        .unwrap_or_default();
    if url.is_empty() {
        return None;
    }
    let (title, published_label) = chapter_labels(node);
    Some(ChapterRef {
        title,
        url,
        published_label,
        slug: None,
    })
}

/// Series page in the standard MangaThemesia layout
pub fn parse_detail(markup: &str, layout: DetailLayout) -> ComicDetail {
    let doc = Document::parse(markup);

    let title = doc
        .text(DETAIL_TITLE)
        .unwrap_or_else(|| UNTITLED.to_string());
    let cover_image_url = doc.attr(DETAIL_COVER, "src").unwrap_or_default();
    let synopsis = doc
        .text(layout.synopsis)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SYNOPSIS.to_string());

    let metadata = Metadata::read(&doc.select_all(DETAIL_META), layout.metadata);

    let genres = doc
        .select_all(layout.genres)
        .iter()
        .map(|n| n.text())
        .filter(|g| !g.is_empty())
        .collect();

    let chapters: Vec<ChapterRef> = doc
        .select_all(CHAPTER_ITEM)
        .iter()
        .filter_map(parse_chapter_item)
        .collect();

    log::debug!("Parsed '{}' with {} chapters", title, chapters.len());

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

/// Absolute image URLs inside the reader area, in reading order
pub fn parse_reader_images(markup: &str) -> ImageSequence {
    let doc = Document::parse(markup);
    let raw = doc.attrs(READER_IMAGES, "src");
    let total = raw.len();
    let images = absolute_urls(raw);
    if images.len() < total {
        log::debug!("Dropped {} non-absolute image sources", total - images.len());
    }
    images
}
