//! Fake LLM provider for testing.
//!
//! This provider returns deterministic responses based on prompt matching,
//! allowing tests to run without network access or API costs.

use super::{LlmError, LlmProvider, RunOptions};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A fake LLM provider for testing.
///
/// Responses are matched by checking if the prompt contains a registered substring.
/// If no match is found, returns a default response or error.
#[derive(Debug)]
pub struct FakeProvider {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Default response if no match found
    default_response: Option<String>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: Some("{}".to_string()),
        }
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Offline stand-in used when no real backend is configured.
    ///
    /// Allergen detection reports nothing, substitution returns three generic
    /// swaps and anything else gets `{}`.
    pub fn with_canned_responses() -> Self {
        let mut provider = Self::default();

        provider.add_response(
            "allergen detection assistant",
            r#"{"matches": [], "safe": true}"#,
        );

        provider.add_response(
            "ingredient substitution assistant",
            r#"```json
[
  {"suggestion": "olive oil", "substitutionRatio": 0.75, "impactEstimate": {"calories": -10, "fat": 1}, "reason": "replaces solid fat in most savory cooking"},
  {"suggestion": "unsweetened applesauce", "substitutionRatio": 0.5, "impactEstimate": {"calories": -80, "fat": -9}, "reason": "keeps baked goods moist with far less fat"},
  {"suggestion": "greek yogurt", "substitutionRatio": 1.0, "impactEstimate": {"calories": -60, "protein": 5}, "reason": "adds moisture and protein"}
]
```"#,
        );

        provider
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn run(&self, prompt: &str, _options: &RunOptions) -> Result<String, LlmError> {
        let responses = self
            .responses
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        // Find first matching pattern (case-insensitive)
        let prompt_lower = prompt.to_lowercase();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        // Return default or error
        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(provider: &FakeProvider, prompt: &str) -> Result<String, LlmError> {
        provider.run(prompt, &RunOptions::default()).await
    }

    #[tokio::test]
    async fn test_fake_provider_matching() {
        let provider = FakeProvider::with_response("hello", "world");
        let result = run(&provider, "Say hello to the user").await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_fake_provider_case_insensitive() {
        let provider = FakeProvider::with_response("HELLO", "world");
        let result = run(&provider, "hello there").await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_fake_provider_no_match() {
        let provider = FakeProvider::new();
        let result = run(&provider, "random prompt").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fake_provider_default_response() {
        let provider = FakeProvider::new().with_default_response("default");
        let result = run(&provider, "random prompt").await.unwrap();
        assert_eq!(result, "default");
    }

    #[tokio::test]
    async fn test_canned_responses() {
        let provider = FakeProvider::with_canned_responses();

        let result = run(&provider, "You are an allergen detection assistant.")
            .await
            .unwrap();
        assert!(result.contains("\"safe\": true"));

        let result = run(&provider, "You are an ingredient substitution assistant.")
            .await
            .unwrap();
        assert!(result.contains("applesauce"));

        let result = run(&provider, "anything else").await.unwrap();
        assert_eq!(result, "{}");
    }
}
