//! Tolerant extraction of JSON payloads from model output.
//!
//! Models wrap JSON in prose or fenced code blocks. Extraction tries the whole
//! response, then the first fenced block, then the outermost bracketed span.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::LlmError;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid regex"));

/// Recover a JSON value from raw model output.
pub fn extract_json(raw: &str) -> Result<Value, LlmError> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(value) = FENCE_RE
        .captures(trimmed)
        .and_then(|caps| serde_json::from_str(caps[1].trim()).ok())
    {
        return Ok(value);
    }

    for (open, close) in bracket_order(trimmed) {
        if let Some(value) = bracketed(trimmed, open, close) {
            return Ok(value);
        }
    }

    Err(LlmError::ParseError(format!(
        "no JSON payload in model response (first 100 chars): {}",
        trimmed.chars().take(100).collect::<String>()
    )))
}

/// Recover and deserialize a JSON payload.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|e| LlmError::ParseError(e.to_string()))
}

/// Try whichever bracket kind opens first before the other.
fn bracket_order(text: &str) -> [(char, char); 2] {
    match (text.find('{'), text.find('[')) {
        (Some(brace), Some(bracket)) if bracket < brace => [('[', ']'), ('{', '}')],
        (None, Some(_)) => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    }
}

fn bracketed(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
