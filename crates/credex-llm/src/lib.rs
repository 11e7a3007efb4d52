//! credex Generation Provider Layer
//!
//! Implementations of the `GenerationProvider` trait from `credex-domain`.
//! Every provider returns the model's raw reply text; interpreting it is the
//! extractor's job.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted provider for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: Any OpenAI-compatible chat completions endpoint
//!
//! # Examples
//!
//! ```
//! use credex_domain::{GenerationProvider, OutputContract};
//! use credex_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(r#"{"mainCategory": "work"}"#);
//! let reply = provider.generate("any prompt", OutputContract::Json).await.unwrap();
//! assert_eq!(reply, r#"{"mainCategory": "work"}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use credex_domain::{GenerationProvider, OutputContract};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur while talking to a provider
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Reply envelope could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Credentials rejected or missing
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

type Scripted = Result<String, String>;

/// Mock provider for deterministic testing
///
/// Lookup order for each call:
/// 1. a response registered for the exact prompt
/// 2. the next scripted response, in push order
/// 3. the default response
///
/// Clones share the script, the prompt log and the call count.
///
/// # Examples
///
/// ```
/// use credex_domain::{GenerationProvider, OutputContract};
/// use credex_llm::MockProvider;
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::default();
/// provider.push_response(r#"{"mainCategory": "work"}"#);
/// provider.push_response(r#"{"subCategory": "workServer"}"#);
///
/// let first = provider.generate("stage a", OutputContract::Json).await.unwrap();
/// let second = provider.generate("stage b", OutputContract::Json).await.unwrap();
/// assert!(first.contains("work"));
/// assert!(second.contains("workServer"));
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that replies with `responses` in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Err("Mock error".to_string()));
    }

    /// Queue the next reply
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Queue a failure as the next reply
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Reset the call count and prompt log
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _contract: OutputContract,
    ) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        let reply = match lock(&self.responses).get(prompt) {
            Some(registered) => registered.clone(),
            None => lock(&self.script)
                .pop_front()
                .unwrap_or_else(|| Ok(self.default_response.clone())),
        };

        reply.map_err(LlmError::Other)
    }
}
