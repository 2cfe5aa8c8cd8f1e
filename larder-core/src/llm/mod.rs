//! Text-generation provider abstraction.
//!
//! The core never talks to a model directly. Allergen detection, substitution
//! advice and translation build self-contained prompts and hand them to an
//! injected [`LlmProvider`], so any backend (remote API, local model, test
//! stub) can satisfy them.

mod caching;
mod claude;
mod fake;
pub mod json;

pub use caching::{CacheEntry, CachingProvider};
pub use claude::ClaudeProvider;
pub use fake::FakeProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::config::{LlmBackend, LlmConfig};

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Per-call options passed through to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// JSON schema the response should satisfy.
    pub response_constraint: Option<serde_json::Value>,
    pub temperature: Option<f32>,
}

impl RunOptions {
    pub fn with_response_constraint(schema: serde_json::Value) -> Self {
        Self {
            response_constraint: Some(schema),
            ..Default::default()
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is responsible
/// for making API calls and returning the model's text response.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt to the LLM and get a text response.
    async fn run(&self, prompt: &str, options: &RunOptions) -> Result<String, LlmError>;

    /// Get the provider name (e.g., "claude", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name (e.g., "claude-3-5-sonnet-20241022").
    fn model_name(&self) -> &str;
}

/// Build the provider selected by `config`.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Fake => Ok(Box::new(FakeProvider::with_canned_responses())),
        LlmBackend::Claude => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
            Ok(Box::new(ClaudeProvider::new(api_key, config.model.clone())))
        }
    }
}

/// Build the provider selected by `config`, wrapped in the disk cache.
pub fn create_cached_provider(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let inner = create_provider(config)?;
    Ok(Box::new(CachingProvider::new(inner, config.cache_dir.clone())))
}
