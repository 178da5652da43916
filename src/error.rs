//! Error types shared by the fetcher, the registry and configuration loading.
//!
//! Transport failures and caller errors are kept in separate enums so the
//! boundary can tell "the source is unreachable" apart from "the request was
//! wrong".

use crate::registry::Operation;
use thiserror::Error;

/// Failure to retrieve markup from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid URL {url:?}")]
    InvalidUrl { url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_builder() {
            FetchError::InvalidUrl {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Rate limiting, server errors, Cloudflare 52x and connection failures.
    /// Timeouts are not retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => is_retryable_status(*status),
            FetchError::Transport { source, .. } => source.is_connect() || source.is_request(),
            _ => false,
        }
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
    )
}

/// Caller or configuration error raised before any adapter runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("source '{0}' is not registered")]
    UnknownSource(String),

    #[error("operation '{0}' is not supported; use latest, detail or chapter")]
    UnsupportedOperation(String),

    #[error("operation '{0}' requires a reference (slug or URL)")]
    MissingReference(Operation),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
