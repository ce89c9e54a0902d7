//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint implementing the `/v1/chat/completions` API. Structured
//! generation passes the target JSON Schema as `response_format`, so the model
//! is constrained to the agreement shape the pipeline parses.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Configurable endpoint, model and credentials
//! - Retry with exponential backoff on rate limiting (HTTP 429) only
//! - Request timeout
//!
//! # Examples
//!
//! ```no_run
//! use covenant_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com/v1", "gpt-4o", "sk-...")
//!     .unwrap()
//!     .with_max_retries(2);
//! ```

use crate::LlmError;
use async_trait::async_trait;
use covenant_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retries after a rate-limited response
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Upper bound on the wait between rate-limited retries
pub const MAX_BACKOFF_SECS: u64 = 60;

/// Provider for OpenAI-compatible chat-completions APIs
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat-completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://api.openai.com/v1")
    /// - `model`: Model to use (e.g., "gpt-4o")
    /// - `api_key`: Bearer token sent with every request
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries after rate limiting
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Model name used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat request and return the assistant message content
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or times out
    /// - Credentials are rejected
    /// - The model is not available
    /// - Rate limiting persists past `max_retries`
    /// - The reply is a refusal or has no content
    async fn chat(&self, prompt: &str, response_format: Option<Value>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let request_body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format,
        };

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status.is_success() {
                let body: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
                return extract_content(body);
            }

            match status {
                reqwest::StatusCode::TOO_MANY_REQUESTS if attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Rate limited by {}, retrying in {}s ({}/{})",
                        self.endpoint,
                        delay.as_secs(),
                        attempt + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimitExceeded),
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    return Err(LlmError::Authentication(format!("HTTP {}", status)));
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(LlmError::ModelNotAvailable(self.model.clone()));
                }
                _ => {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}

/// Build the `response_format` value for a JSON Schema description
/// Exponential backoff: 1s, 2s, 4s, etc., capped at [`MAX_BACKOFF_SECS`]
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}

fn json_schema_format(schema: &str) -> Result<Value, LlmError> {
    let schema: Value = serde_json::from_str(schema)
        .map_err(|e| LlmError::Other(format!("Invalid JSON schema: {}", e)))?;
    let name = schema
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("extraction")
        .to_string();

    Ok(serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "schema": schema,
        }
    }))
}

fn extract_content(body: ChatResponse) -> Result<String, LlmError> {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Err(LlmError::InvalidResponse(format!("Model refused: {}", refusal)));
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(LlmError::InvalidResponse("Empty message content".to_string())),
    }
}

#[async_trait]
impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.chat(prompt, None).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        let format = json_schema_format(schema)?;
        debug!("Structured request against schema '{}'", format["json_schema"]["name"]);
        self.chat(prompt, Some(format)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("http://localhost:8000/v1/", "gpt-4o", "key").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:8000/v1");
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_openai_provider_with_max_retries() {
        let provider = OpenAiProvider::new(DEFAULT_ENDPOINT, "gpt-4o", "key")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(provider.max_retries, 5);
    }

    #[test]
    fn test_backoff_delay_doubles_then_caps() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(6), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(64), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = OpenAiProvider::new(DEFAULT_ENDPOINT, "gpt-4o", "sk-secret").unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4o"));
    }

    #[test]
    fn test_json_schema_format_uses_title() {
        let format = json_schema_format(r#"{"title": "CreditAgreement", "type": "object"}"#).unwrap();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "CreditAgreement");
        assert_eq!(format["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn test_json_schema_format_rejects_invalid_schema() {
        assert!(matches!(
            json_schema_format("not json"),
            Err(LlmError::Other(_))
        ));
    }

    #[test]
    fn test_extract_content_refusal() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": null, "refusal": "cannot help"}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_content(body),
            Err(LlmError::InvalidResponse(msg)) if msg.contains("cannot help")
        ));
    }

    #[test]
    fn test_extract_content_ok() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "{}"}}]}"#).unwrap();
        assert_eq!(extract_content(body).unwrap(), "{}");
    }

    #[test]
    fn test_extract_content_no_choices() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_content(body).is_err());
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        // Nothing listens on port 9; the connection fails immediately
        let provider = OpenAiProvider::new("http://127.0.0.1:9/v1", "gpt-4o", "key").unwrap();

        let result = provider.generate("test").await;
        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }
}
