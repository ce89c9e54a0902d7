//! Covenant LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `covenant-domain`, the
//! extraction capability the pipeline treats as a black box.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API with JSON-schema output
//!
//! # Examples
//!
//! ```
//! use covenant_llm::MockProvider;
//! use covenant_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(provider.generate("test prompt")).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use covenant_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Credentials rejected by the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

type Reply = Result<String, String>;

#[derive(Debug, Default)]
struct MockState {
    exact: HashMap<String, Reply>,
    containing: Vec<(String, Reply)>,
    script: VecDeque<Reply>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are resolved in this order:
/// 1. a reply registered for the exact prompt
/// 2. the first reply whose needle occurs in the prompt
/// 3. the next scripted reply (FIFO)
/// 4. the default response
///
/// Needle matching stays deterministic when calls run concurrently, which
/// scripted replies do not.
///
/// # Examples
///
/// ```
/// use covenant_llm::MockProvider;
/// use covenant_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_error("second fails");
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// assert_eq!(rt.block_on(provider.generate("a")).unwrap(), "first");
/// assert!(rt.block_on(provider.generate("b")).is_err());
/// assert_eq!(rt.block_on(provider.generate("c")).unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state().exact.insert(prompt.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.state()
            .exact
            .insert(prompt.into(), Err("Mock error".to_string()));
    }

    /// Respond with `response` to any prompt containing `needle`
    pub fn add_response_containing(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.state()
            .containing
            .push((needle.into(), Ok(response.into())));
    }

    /// Fail any prompt containing `needle`
    pub fn add_error_containing(&mut self, needle: impl Into<String>, message: impl Into<String>) {
        self.state()
            .containing
            .push((needle.into(), Err(message.into())));
    }

    /// Queue a response for the next otherwise-unmatched call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state().script.push_back(Ok(response.into()));
    }

    /// Queue an error for the next otherwise-unmatched call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().script.push_back(Err(message.into()));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Every prompt received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }

    fn reply(&self, prompt: &str) -> Result<String, LlmError> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.prompts.push(prompt.to_string());

        let reply = if let Some(reply) = state.exact.get(prompt) {
            reply.clone()
        } else if let Some((_, reply)) = state
            .containing
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            reply.clone()
        } else if let Some(reply) = state.script.pop_front() {
            reply
        } else {
            Ok(self.default_response.clone())
        };

        reply.map_err(LlmError::Other)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply(prompt)
    }

    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.reply(prompt)
    }
}
