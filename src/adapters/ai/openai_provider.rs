//! OpenAI Provider - Implementation of AIProvider for chat-completion APIs.
//!
//! Works against OpenAI and any endpoint that speaks the same
//! `/chat/completions` protocol (set `base_url` accordingly).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! The adapter makes exactly one HTTP attempt per `complete` call. Retry
//! policy belongs to the caller, which knows whether it is on the chunked or
//! the single-batch path.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout when the request does not carry its own.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    ///
    /// Fails with [`AIError::Configuration`] when the API key is blank or the
    /// HTTP client cannot be built, so a bad deployment fails at startup
    /// instead of on the first request.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        if config.api_key().trim().is_empty() {
            return Err(AIError::configuration("API key is missing"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AIError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: MessageRole::System.as_str().to_string(),
                content: Some(prompt.clone()),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.content.clone()),
            });
        }

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
        }
    }

    /// Sends a request with the given deadline.
    async fn send_request(
        &self,
        request: &CompletionRequest,
        timeout: Duration,
    ) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .timeout(timeout)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e, timeout))
    }

    /// Maps a failure to send a request or read its body.
    fn transport_error(e: &reqwest::Error, timeout: Duration) -> AIError {
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX),
            }
        } else if e.is_connect() {
            AIError::network(format!("Connection failed: {}", e))
        } else {
            AIError::network(e.to_string())
        }
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after_header = Self::retry_after_header(response.headers());
        let error_body = response.text().await.unwrap_or_default();

        Err(Self::classify_status(
            status.as_u16(),
            &error_body,
            retry_after_header,
        ))
    }

    /// Maps a non-success status and body to an [`AIError`].
    fn classify_status(status: u16, error_body: &str, retry_after: Option<u32>) -> AIError {
        match status {
            401 | 403 => AIError::AuthenticationFailed,
            429 => {
                if error_body.contains("insufficient_quota") {
                    AIError::QuotaExceeded
                } else {
                    AIError::rate_limited(
                        retry_after.unwrap_or_else(|| Self::parse_retry_after(error_body)),
                    )
                }
            }
            400 | 404 | 413 | 422 => AIError::InvalidRequest(error_body.to_string()),
            502..=504 => AIError::unavailable(format!("Server returned {}", status)),
            500..=599 => AIError::ServerError { status },
            _ => AIError::UnexpectedStatus { status },
        }
    }

    fn retry_after_header(headers: &HeaderMap) -> Option<u32> {
        headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u32>()
            .ok()
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        // "Please try again in 20s." appears in the message of some 429 bodies
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(s) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = s.find("try again in ") {
                    let rest = &s[idx + 13..];
                    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if let Ok(secs) = digits.parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
        DEFAULT_RETRY_AFTER_SECS
    }

    /// Reads and decodes a successful response.
    ///
    /// A body that stalls or breaks off is a transport failure; only a body
    /// that arrives whole but is not a valid envelope is a parse failure.
    async fn parse_response(
        &self,
        response: Response,
        timeout: Duration,
    ) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e, timeout))?;

        Self::decode_envelope(&body)
    }

    fn decode_envelope(body: &str) -> Result<CompletionResponse, AIError> {
        let openai_response: OpenAIResponse = serde_json::from_str(body)
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Self::into_completion(openai_response)
    }

    fn into_completion(openai_response: OpenAIResponse) -> Result<CompletionResponse, AIError> {
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let usage = openai_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: openai_response.model,
            finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
        })
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let response = self.send_request(&request, timeout).await?;
        self.parse_response(response, timeout).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RequestMetadata;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use uuid::Uuid;

    fn provider() -> OpenAIProvider {
        OpenAIProvider::new(OpenAIConfig::new("test-key")).unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30))
            .with_connect_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn config_debug_does_not_leak_key() {
        let config = OpenAIConfig::new("sk-very-secret");
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }

    #[test]
    fn blank_api_key_fails_at_construction() {
        let result = OpenAIProvider::new(OpenAIConfig::new("  "));
        assert!(matches!(result, Err(AIError::Configuration(_))));
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let provider =
            OpenAIProvider::new(OpenAIConfig::new("k").with_base_url("http://localhost:8080/v1/"))
                .unwrap();
        assert_eq!(
            provider.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_carries_sampling_parameters() {
        let request = CompletionRequest::new(RequestMetadata::new(Uuid::nil(), None))
            .with_system_prompt("rubric")
            .with_message(MessageRole::User, "reviews")
            .with_max_tokens(425)
            .with_temperature(0.0)
            .with_top_p(0.1);

        let body = serde_json::to_value(provider().to_openai_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "rubric");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "reviews");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 425);
        assert!((body["top_p"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn classify_status_covers_failure_classes() {
        assert_eq!(
            OpenAIProvider::classify_status(401, "", None),
            AIError::AuthenticationFailed
        );
        assert_eq!(
            OpenAIProvider::classify_status(429, r#"{"error":{"code":"insufficient_quota"}}"#, None),
            AIError::QuotaExceeded
        );
        assert_eq!(
            OpenAIProvider::classify_status(429, "", Some(12)),
            AIError::rate_limited(12)
        );
        assert!(matches!(
            OpenAIProvider::classify_status(400, "bad", None),
            AIError::InvalidRequest(_)
        ));
        assert!(matches!(
            OpenAIProvider::classify_status(503, "", None),
            AIError::Unavailable { .. }
        ));
        assert_eq!(
            OpenAIProvider::classify_status(500, "", None),
            AIError::ServerError { status: 500 }
        );
        assert_eq!(
            OpenAIProvider::classify_status(418, "", None),
            AIError::UnexpectedStatus { status: 418 }
        );
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 20s."}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 20);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Something went wrong"}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 30);
    }

    #[test]
    fn envelope_extracts_first_choice() {
        let envelope: OpenAIResponse = serde_json::from_str(
            r#"{"model":"gpt-4o-mini","choices":[{"message":{"role":"assistant","content":"[]"},"finish_reason":"length"}],"usage":{"prompt_tokens":10,"completion_tokens":5}}"#,
        )
        .unwrap();

        let completion = OpenAIProvider::into_completion(envelope).unwrap();

        assert_eq!(completion.content, "[]");
        assert_eq!(completion.finish_reason, FinishReason::Length);
        assert_eq!(completion.usage.total_tokens, 15);
    }

    #[test]
    fn envelope_without_choices_is_parse_error() {
        let envelope: OpenAIResponse =
            serde_json::from_str(r#"{"model":"m","choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAIProvider::into_completion(envelope),
            Err(AIError::Parse(_))
        ));
    }

    #[test]
    fn invalid_envelope_body_is_parse_error() {
        assert!(matches!(
            OpenAIProvider::decode_envelope("<html>Bad Gateway</html>"),
            Err(AIError::Parse(_))
        ));
    }

    /// Serves one canned HTTP response, optionally holding the socket open.
    async fn serve_once(response: &'static [u8], hold_open: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
            if hold_open {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });
        format!("http://{addr}")
    }

    async fn complete_against(base_url: String) -> Result<CompletionResponse, AIError> {
        let provider = OpenAIProvider::new(OpenAIConfig::new("k").with_base_url(base_url)).unwrap();
        let request = CompletionRequest::new(RequestMetadata::new(Uuid::nil(), None))
            .with_message(MessageRole::User, "reviews")
            .with_timeout(Duration::from_millis(300));
        tokio::time::timeout(Duration::from_secs(5), provider.complete(request))
            .await
            .expect("provider call should finish within its own timeout")
    }

    #[tokio::test]
    async fn stalled_body_is_retryable_transport_failure() {
        let base_url = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"model\"",
            true,
        )
        .await;

        let err = complete_against(base_url).await.unwrap_err();

        assert!(
            matches!(err, AIError::Timeout { .. } | AIError::Network(_)),
            "got {err:?}"
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn body_cut_off_mid_stream_is_network_failure() {
        let base_url = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"model\"",
            false,
        )
        .await;

        let err = complete_against(base_url).await.unwrap_err();

        assert!(matches!(err, AIError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn complete_but_malformed_body_is_parse_failure() {
        let base_url = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 8\r\nconnection: close\r\n\r\nnot json",
            false,
        )
        .await;

        let err = complete_against(base_url).await.unwrap_err();

        assert!(matches!(err, AIError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn null_content_becomes_empty_string() {
        let envelope: OpenAIResponse = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAIProvider::into_completion(envelope).unwrap().content, "");
    }
}
