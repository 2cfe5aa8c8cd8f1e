//! Claude (Anthropic) LLM provider.

use super::{LlmError, LlmProvider, RunOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Claude API provider.
#[derive(Debug)]
pub struct ClaudeProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ClaudeProvider {
    /// Create a new ClaudeProvider with the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Claude API request format.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

/// Claude API response format.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeApiError {
    message: String,
}

/// Error response from Claude API.
#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeApiError,
}

/// The Messages API has no schema parameter, so a response constraint becomes
/// a system instruction.
fn system_prompt(options: &RunOptions) -> Option<String> {
    options.response_constraint.as_ref().map(|schema| {
        format!("Respond with JSON only. The response must satisfy this JSON schema:\n{schema}")
    })
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn run(&self, prompt: &str, options: &RunOptions) -> Result<String, LlmError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: system_prompt(options),
            temperature: options.temperature,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if status != 200 {
            // Try to parse error response
            if let Ok(error_response) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
                return Err(LlmError::ApiError {
                    status,
                    message: error_response.error.message,
                });
            }
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let response: ClaudeResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        // Extract text from the first text content block
        response
            .content
            .into_iter()
            .find_map(|c| (c.content_type == "text").then_some(c.text).flatten())
            .ok_or_else(|| LlmError::ParseError("No text content in response".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "claude"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_constraint_as_system_prompt() {
        let options = RunOptions {
            response_constraint: Some(serde_json::json!({"type": "array"})),
            temperature: Some(0.2),
        };
        let request = ClaudeRequest {
            model: "claude-test".to_string(),
            max_tokens: 16,
            system: system_prompt(&options),
            temperature: options.temperature,
            messages: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["system"]
            .as_str()
            .unwrap()
            .contains(r#"{"type":"array"}"#));
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_request_omits_unset_options() {
        let request = ClaudeRequest {
            model: "claude-test".to_string(),
            max_tokens: 16,
            system: system_prompt(&RunOptions::default()),
            temperature: None,
            messages: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let body = r#"{"content": [{"type": "tool_use"}, {"type": "text", "text": "hi"}]}"#;
        let response: ClaudeResponse = serde_json::from_str(body).unwrap();
        let text = response
            .content
            .into_iter()
            .find_map(|c| (c.content_type == "text").then_some(c.text).flatten());
        assert_eq!(text.as_deref(), Some("hi"));
    }
}
