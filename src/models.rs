use serde::{Deserialize, Serialize};

/// Placeholder for metadata a source does not expose
pub const NOT_AVAILABLE: &str = "N/A";

/// One entry of a source's latest-updates listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComicSummary {
    pub title: String,
    pub thumbnail_url: String,
    /// Slug or absolute URL, depending on the source's convention
    pub identifier: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComicDetail {
    pub title: String,
    pub cover_image_url: String,
    pub author: String,
    pub status: String,
    pub genres: Vec<String>,
    pub synopsis: String,
    /// Source order, newest first
    pub chapters: Vec<ChapterRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRef {
    pub title: String,
    pub url: String,
    /// Free-text release date as printed by the source
    pub published_label: String,
    /// Last path segment of `url`, for sources whose image lookup takes a slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Page image URLs in reading order
pub type ImageSequence = Vec<String>;
