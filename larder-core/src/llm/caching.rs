//! On-disk response cache in front of another [`LlmProvider`].
//!
//! Entries live at `<cache_dir>/<provider>/<model>/<key>.json`, where the key
//! covers the prompt text and every [`RunOptions`] field that can change the
//! reply. Only successful replies are stored.

use super::{LlmError, LlmProvider, RunOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// One stored reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub provider: String,
    pub model: String,
    pub request_key: String,
    pub stored_at: DateTime<Utc>,
    pub response: String,
}

/// Hex digest identifying a request. Truncated to 128 bits for file names.
fn request_key(prompt: &str, options: &RunOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    if let Some(schema) = &options.response_constraint {
        hasher.update(b"\0schema:");
        hasher.update(schema.to_string().as_bytes());
    }
    if let Some(temperature) = options.temperature {
        hasher.update(b"\0temperature:");
        hasher.update(temperature.to_bits().to_le_bytes());
    }
    hex::encode(&hasher.finalize()[..16])
}

fn cache_error(e: impl ToString) -> LlmError {
    LlmError::CacheError(e.to_string())
}

#[derive(Debug)]
pub struct CachingProvider {
    inner: Box<dyn LlmProvider>,
    cache_dir: PathBuf,
}

impl CachingProvider {
    pub fn new(inner: Box<dyn LlmProvider>, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    /// Directory holding entries for the wrapped provider and model.
    fn entry_dir(&self) -> PathBuf {
        // Model ids like "org/model:tag" must stay one path segment.
        let model = self.inner.model_name().replace(['/', ':'], "_");
        self.cache_dir.join(self.inner.provider_name()).join(model)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.entry_dir().join(format!("{key}.json"))
    }

    /// A missing or unreadable entry is a miss.
    fn load(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    fn store(&self, key: &str, response: &str) -> Result<PathBuf, LlmError> {
        fs::create_dir_all(self.entry_dir()).map_err(cache_error)?;
        let entry = CacheEntry {
            provider: self.inner.provider_name().to_string(),
            model: self.inner.model_name().to_string(),
            request_key: key.to_string(),
            stored_at: Utc::now(),
            response: response.to_string(),
        };
        let path = self.entry_path(key);
        let json = serde_json::to_string_pretty(&entry).map_err(cache_error)?;
        fs::write(&path, json).map_err(cache_error)?;
        Ok(path)
    }
}

#[async_trait]
impl LlmProvider for CachingProvider {
    async fn run(&self, prompt: &str, options: &RunOptions) -> Result<String, LlmError> {
        let key = request_key(prompt, options);
        let provider = self.inner.provider_name();
        let model = self.inner.model_name();

        if let Some(entry) = self.load(&key) {
            tracing::debug!(provider, model, key = %key, "model reply served from cache");
            return Ok(entry.response);
        }

        tracing::debug!(provider, model, key = %key, "cache miss");
        let response = self.inner.run(prompt, options).await?;

        match self.store(&key, &response) {
            Ok(path) => tracing::debug!(path = %path.display(), "stored model reply"),
            Err(e) => tracing::warn!(error = %e, "could not store model reply"),
        }
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;
    use std::path::Path;
    use tempfile::TempDir;

    fn entry_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_reply_is_stored_once() {
        let temp_dir = TempDir::new().unwrap();
        let fake = Box::new(FakeProvider::with_response("hello", "world"));
        let provider = CachingProvider::new(fake, temp_dir.path().to_path_buf());
        let options = RunOptions::default();

        assert_eq!(provider.run("hello there", &options).await.unwrap(), "world");
        assert_eq!(provider.run("hello there", &options).await.unwrap(), "world");
        assert_eq!(entry_count(&provider.entry_dir()), 1);

        let key = request_key("hello there", &options);
        let entry = provider.load(&key).unwrap();
        assert_eq!(entry.provider, "fake");
        assert_eq!(entry.request_key, key);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let temp_dir = TempDir::new().unwrap();
        let options = RunOptions::default();

        let first = CachingProvider::new(
            Box::new(FakeProvider::with_response("hello", "world")),
            temp_dir.path().to_path_buf(),
        );
        first.run("hello there", &options).await.unwrap();

        // Same provider/model names, but no configured responses: only the cache can answer.
        let second = CachingProvider::new(Box::new(FakeProvider::new()), temp_dir.path().to_path_buf());
        let result = second.run("hello there", &options).await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_options_are_part_of_the_key() {
        let temp_dir = TempDir::new().unwrap();
        let fake = Box::new(FakeProvider::with_response("hello", "world"));
        let provider = CachingProvider::new(fake, temp_dir.path().to_path_buf());

        provider.run("hello", &RunOptions::default()).await.unwrap();
        provider
            .run(
                "hello",
                &RunOptions::with_response_constraint(serde_json::json!({"type": "object"})),
            )
            .await
            .unwrap();

        assert_eq!(entry_count(&provider.entry_dir()), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let provider = CachingProvider::new(Box::new(FakeProvider::new()), temp_dir.path().to_path_buf());

        assert!(provider.run("hello", &RunOptions::default()).await.is_err());
        assert_eq!(entry_count(&provider.entry_dir()), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let fake = Box::new(FakeProvider::with_response("hello", "world"));
        let provider = CachingProvider::new(fake, temp_dir.path().to_path_buf());
        let options = RunOptions::default();

        let key = request_key("hello", &options);
        fs::create_dir_all(provider.entry_dir()).unwrap();
        fs::write(provider.entry_path(&key), "not json").unwrap();

        assert_eq!(provider.run("hello", &options).await.unwrap(), "world");
        assert_eq!(provider.load(&key).unwrap().response, "world");
    }
}
