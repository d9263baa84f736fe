//! AI Provider Port - Interface for chat-completion LLM integrations.
//!
//! This port abstracts the upstream scoring model, so the dispatcher can send
//! review batches without coupling to a specific vendor or HTTP stack.
//!
//! # Design
//!
//! - One non-streaming completion per call
//! - Provider-agnostic message format
//! - Per-request timeout, set by the caller (chunk vs single-batch policy)
//! - Error types classify upstream failures for retry and user messaging
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct CannedProvider;
//!
//! #[async_trait]
//! impl AIProvider for CannedProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
//!         Ok(CompletionResponse {
//!             content: "[]".to_string(),
//!             usage: TokenUsage::default(),
//!             model: "canned".to_string(),
//!             finish_reason: FinishReason::Stop,
//!         })
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("canned", "canned")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::scoring::{AnalysisError, UpstreamFailure};

/// Port for AI/LLM provider interactions.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for AI completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages (the user prompt for a review batch).
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness (0.0 = deterministic).
    pub temperature: Option<f32>,
    /// Nucleus sampling bound.
    pub top_p: Option<f32>,
    /// Overall deadline for this request; provider default when `None`.
    pub timeout: Option<Duration>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Creates a new completion request with required metadata.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout: None,
            metadata,
        }
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Sets the nucleus sampling bound.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the content of the last user message, if any.
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
        }
    }
}

/// Request metadata for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Analysis run this request belongs to.
    pub run_id: Uuid,
    /// Chunk position within the run; `None` for the single-batch path.
    pub chunk_index: Option<usize>,
}

impl RequestMetadata {
    /// Creates new request metadata.
    pub fn new(run_id: Uuid, chunk_index: Option<usize>) -> Self {
        Self {
            run_id,
            chunk_index,
        }
    }
}

/// Response from AI completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Token usage.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit; output is probably truncated.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

impl FinishReason {
    /// Maps a provider finish reason string; unknown values count as `Stop`.
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai").
    pub name: String,
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Account quota or billing limit exhausted.
    #[error("quota exceeded")]
    QuotaExceeded,

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider is temporarily unavailable (502/503/504).
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Provider returned another 5xx status.
    #[error("server error: status {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// Provider returned a status outside the classified set.
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Failed to parse the provider's response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider could not be constructed (missing credential, bad client setup).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::ServerError { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }

    /// Short machine-readable class for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AIError::RateLimited { .. } => "rate_limited",
            AIError::QuotaExceeded => "quota_exceeded",
            AIError::AuthenticationFailed => "authentication",
            AIError::InvalidRequest(_) => "bad_request",
            AIError::Unavailable { .. } => "service_unavailable",
            AIError::ServerError { .. } => "server_error",
            AIError::UnexpectedStatus { .. } => "unexpected_status",
            AIError::Network(_) => "network",
            AIError::Timeout { .. } => "timeout",
            AIError::Parse(_) => "parse",
            AIError::Configuration(_) => "configuration",
        }
    }
}

impl From<AIError> for AnalysisError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::RateLimited { .. } => {
                AnalysisError::upstream(UpstreamFailure::RateLimited, Some(429))
            }
            AIError::QuotaExceeded => {
                AnalysisError::upstream(UpstreamFailure::QuotaExceeded, Some(429))
            }
            AIError::AuthenticationFailed => {
                AnalysisError::upstream(UpstreamFailure::Authentication, None)
            }
            AIError::InvalidRequest(_) => {
                AnalysisError::upstream(UpstreamFailure::BadRequest, Some(400))
            }
            AIError::Unavailable { .. } => {
                AnalysisError::upstream(UpstreamFailure::ServiceUnavailable, None)
            }
            AIError::ServerError { status } | AIError::UnexpectedStatus { status } => {
                AnalysisError::upstream(UpstreamFailure::ServerError, Some(status))
            }
            AIError::Network(message) => AnalysisError::transport(message),
            AIError::Timeout { timeout_secs } => {
                AnalysisError::transport(format!("timed out after {timeout_secs}s"))
            }
            AIError::Parse(message) => AnalysisError::transport(message),
            AIError::Configuration(message) => AnalysisError::Configuration(message),
        }
    }
}
