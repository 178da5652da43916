//! Small URL and text helpers shared by the site adapters.

use reqwest::Url;

/// True for well-formed absolute `http`/`https` URLs with a host
pub fn is_absolute_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

/// Trim every candidate and keep only absolute URLs, preserving order
pub fn absolute_urls<I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && is_absolute_url(s))
        .collect()
}

/// Path of `link`, resolved against `base` when it is relative
pub fn url_path(link: &str, base: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let url = match Url::parse(link) {
        Ok(u) => u,
        Err(_) => Url::parse(base).ok()?.join(link).ok()?,
    };
    Some(url.path().to_string())
}

/// Last non-empty path segment, e.g. `chapter-12` for `.../one-piece-chapter-12/`
pub fn last_path_segment(link: &str, base: &str) -> Option<String> {
    let path = url_path(link, base)?;
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Lowercased metadata key with the trailing colon removed
pub fn normalize_key(raw: &str) -> String {
    raw.replace(':', "").trim().to_lowercase()
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
