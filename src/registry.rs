//! Source registry and dispatcher.
//!
//! The registry maps source ids to adapters once at startup and is read-only
//! afterwards. Each invocation runs the adapter in its own task so a panic
//! inside one adapter becomes an empty result instead of taking the caller
//! down, and a semaphore bounds how many operations run at once.

use crate::config::Config;
use crate::error::{DispatchError, FetchError};
use crate::http_client::HttpFetcher;
use crate::metrics::MetricsTracker;
use crate::models::{ComicDetail, ComicSummary, ImageSequence};
use crate::sources::{ComicSource, Source};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListLatest,
    GetDetail,
    GetChapterImages,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListLatest => "list-latest",
            Operation::GetDetail => "get-detail",
            Operation::GetChapterImages => "get-chapter-images",
        }
    }

    pub fn requires_reference(self) -> bool {
        !matches!(self, Operation::ListLatest)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DispatchError;

    /// Accepts both the long names and the short `latest`/`detail`/`chapter`
    /// forms used by the HTTP API.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list-latest" | "latest" => Ok(Operation::ListLatest),
            "get-detail" | "detail" => Ok(Operation::GetDetail),
            "get-chapter-images" | "chapter" | "images" => Ok(Operation::GetChapterImages),
            other => Err(DispatchError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Result of one operation, shaped by the operation requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Comics(Vec<ComicSummary>),
    Detail(Option<ComicDetail>),
    Images(ImageSequence),
}

impl Payload {
    /// The "no data" value an adapter returns when its page is unreachable
    pub fn empty(operation: Operation) -> Self {
        match operation {
            Operation::ListLatest => Payload::Comics(Vec::new()),
            Operation::GetDetail => Payload::Detail(None),
            Operation::GetChapterImages => Payload::Images(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Comics(list) => list.is_empty(),
            Payload::Detail(detail) => detail.is_none(),
            Payload::Images(images) => images.is_empty(),
        }
    }
}

pub struct Registry {
    adapters: HashMap<&'static str, Arc<dyn ComicSource>>,
    limiter: Arc<Semaphore>,
    metrics: MetricsTracker,
}

impl Registry {
    /// Build every known source with one shared fetcher, applying base URL
    /// overrides from the configuration.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = Arc::new(HttpFetcher::with_config(config.http.to_client_config())?);
        let adapters = Source::ALL
            .into_iter()
            .map(|source| {
                let base_url = config
                    .base_url_for(source.id())
                    .unwrap_or_else(|| source.default_base_url());
                log::info!("Registered source '{}' at {}", source.id(), base_url);
                source.build(fetcher.clone(), base_url)
            })
            .collect();
        Ok(Self::with_adapters(
            adapters,
            config.dispatch.max_concurrent_requests,
        ))
    }

    pub fn with_adapters(adapters: Vec<Arc<dyn ComicSource>>, max_concurrent: usize) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self {
            adapters,
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            metrics: MetricsTracker::new(),
        }
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.adapters.contains_key(source_id)
    }

    pub fn get(&self, source_id: &str) -> Option<&Arc<dyn ComicSource>> {
        self.adapters.get(source_id)
    }

    /// Registered ids, sorted
    pub fn source_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.adapters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    /// Run `operation` on `source_id`.
    ///
    /// Caller errors (unknown source, missing reference) come back as
    /// [`DispatchError`]. Everything that goes wrong inside the adapter,
    /// including a panic, comes back as the operation's empty payload.
    pub async fn invoke(
        &self,
        source_id: &str,
        operation: Operation,
        reference: Option<&str>,
    ) -> Result<Payload, DispatchError> {
        let adapter = self
            .adapters
            .get(source_id)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownSource(source_id.to_string()))?;

        let reference = match reference.map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ if operation.requires_reference() => {
                return Err(DispatchError::MissingReference(operation))
            }
            _ => String::new(),
        };

        // The permit moves into the task so it is held until the adapter
        // finishes, even when the caller stops waiting. The semaphore is
        // never closed, so acquiring cannot fail.
        let permit = self.limiter.clone().acquire_owned().await.ok();
        let started = Instant::now();

        let task = tokio::spawn(async move {
            let _permit = permit;
            match operation {
                Operation::ListLatest => Payload::Comics(adapter.list_latest().await),
                Operation::GetDetail => Payload::Detail(adapter.get_detail(&reference).await),
                Operation::GetChapterImages => {
                    Payload::Images(adapter.get_chapter_images(&reference).await)
                }
            }
        });

        let payload = match task.await {
            Ok(payload) => {
                if payload.is_empty() {
                    self.metrics.record_empty(source_id, started.elapsed());
                } else {
                    self.metrics.record_success(source_id, started.elapsed());
                }
                payload
            }
            Err(e) => {
                log::error!("{}: {} aborted: {}", source_id, operation, e);
                self.metrics.record_fault(source_id, e.to_string());
                Payload::empty(operation)
            }
        };

        Ok(payload)
    }
}
