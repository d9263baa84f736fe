//! Caller-facing failure classes for a scoring run.
//!
//! Display strings are written for end users and never include the raw
//! upstream payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified reason the scoring service rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamFailure {
    RateLimited,
    QuotaExceeded,
    Authentication,
    BadRequest,
    ServiceUnavailable,
    ServerError,
}

impl UpstreamFailure {
    /// Message suitable for showing to the person who requested the analysis.
    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamFailure::RateLimited => {
                "The review analysis service is busy right now. Please try again in a minute."
            }
            UpstreamFailure::QuotaExceeded => {
                "The review analysis service has reached its usage quota. Please try again later."
            }
            UpstreamFailure::Authentication => {
                "The review analysis service rejected our credentials. Please contact support."
            }
            UpstreamFailure::BadRequest => {
                "The review analysis service could not process these reviews."
            }
            UpstreamFailure::ServiceUnavailable => {
                "The review analysis service is temporarily unavailable. Please try again later."
            }
            UpstreamFailure::ServerError => {
                "The review analysis service hit an internal error. Please try again."
            }
        }
    }

    /// Returns true if retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamFailure::RateLimited
                | UpstreamFailure::ServiceUnavailable
                | UpstreamFailure::ServerError
        )
    }
}

/// Failure of a whole analysis request.
///
/// Only the single-batch path produces these; chunked dispatch degrades to
/// partial results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Missing credential or unusable client setup. Raised at construction.
    #[error("Review analysis is not configured: {0}")]
    Configuration(String),

    /// Network failure or timeout reaching the scoring service.
    #[error("Could not reach the review analysis service. Please try again shortly.")]
    Transport { message: String },

    /// Non-success status from the scoring service.
    #[error("{}", .kind.user_message())]
    Upstream {
        kind: UpstreamFailure,
        status: Option<u16>,
    },
}

impl AnalysisError {
    pub fn transport(message: impl Into<String>) -> Self {
        AnalysisError::Transport {
            message: message.into(),
        }
    }

    pub fn upstream(kind: UpstreamFailure, status: Option<u16>) -> Self {
        AnalysisError::Upstream { kind, status }
    }

    /// Short machine-readable class for logs and metrics.
    pub fn class(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => "configuration",
            AnalysisError::Transport { .. } => "transport",
            AnalysisError::Upstream { kind, .. } => match kind {
                UpstreamFailure::RateLimited => "rate_limited",
                UpstreamFailure::QuotaExceeded => "quota_exceeded",
                UpstreamFailure::Authentication => "authentication",
                UpstreamFailure::BadRequest => "bad_request",
                UpstreamFailure::ServiceUnavailable => "service_unavailable",
                UpstreamFailure::ServerError => "server_error",
            },
        }
    }
}
