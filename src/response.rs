//! Uniform response envelope for callers of the registry.

use crate::error::DispatchError;
use crate::registry::{Operation, Payload, Registry};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    NotFound,
    UnsupportedSource,
    InvalidRequest,
}

impl Outcome {
    /// HTTP status the API answers with for this outcome
    pub fn http_status(self) -> u16 {
        match self {
            Outcome::Success => 200,
            Outcome::NotFound => 404,
            Outcome::UnsupportedSource | Outcome::InvalidRequest => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub outcome: Outcome,
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success(source_id: &str, data: Payload) -> Self {
        Self {
            outcome: Outcome::Success,
            source_id: Some(source_id.to_string()),
            data: Some(data),
            message: None,
        }
    }

    pub fn not_found(source_id: &str) -> Self {
        Self {
            outcome: Outcome::NotFound,
            source_id: Some(source_id.to_string()),
            data: None,
            message: Some("No data found; the reference may be invalid or the source unreachable".to_string()),
        }
    }

    pub fn invalid_request(source_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::InvalidRequest,
            source_id: source_id.map(str::to_string),
            data: None,
            message: Some(message.into()),
        }
    }

    /// Normalize a registry result.
    ///
    /// An absent detail is "not found"; any list, even an empty one, is a
    /// success.
    pub fn from_result(source_id: &str, result: Result<Payload, DispatchError>) -> Self {
        match result {
            Ok(Payload::Detail(None)) => Self::not_found(source_id),
            Ok(payload) => Self::success(source_id, payload),
            Err(e) => Self::from_error(source_id, &e),
        }
    }

    pub fn from_error(source_id: &str, err: &DispatchError) -> Self {
        let outcome = match err {
            DispatchError::UnknownSource(_) => Outcome::UnsupportedSource,
            DispatchError::UnsupportedOperation(_) | DispatchError::MissingReference(_) => {
                Outcome::InvalidRequest
            }
        };
        Self {
            outcome,
            source_id: Some(source_id.to_string()),
            data: None,
            message: Some(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Validate raw request parameters and run the operation.
///
/// Checks run in order: source present, source registered, operation valid,
/// reference present when the operation needs one.
pub async fn respond(
    registry: &Registry,
    source: Option<&str>,
    operation: Option<&str>,
    reference: Option<&str>,
) -> Envelope {
    let source_id = match source.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => return Envelope::invalid_request(None, "parameter 'source' is required"),
    };

    if !registry.contains(source_id) {
        return Envelope::from_error(source_id, &DispatchError::UnknownSource(source_id.to_string()));
    }

    let operation = match operation.map(str::parse::<Operation>) {
        Some(Ok(op)) => op,
        Some(Err(e)) => return Envelope::from_error(source_id, &e),
        None => {
            return Envelope::invalid_request(
                Some(source_id),
                "parameter 'type' is required; use latest, detail or chapter",
            )
        }
    };

    let result = registry.invoke(source_id, operation, reference).await;
    Envelope::from_result(source_id, result)
}
