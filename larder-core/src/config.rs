//! Configuration from environment variables.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default Claude model.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Fake,
    Claude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionBackend {
    Local,
    Usda,
}

/// Text-generation backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub model: String,
    /// Required for the Claude backend.
    pub api_key: Option<String>,
    /// Directory for cached responses.
    pub cache_dir: PathBuf,
}

/// Nutrient lookup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NutritionConfig {
    pub backend: NutritionBackend,
    pub usda_api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub llm: LlmConfig,
    pub nutrition: NutritionConfig,
    /// When set, nutrient lookups never leave the process.
    pub privacy_mode: bool,
}

impl CoreConfig {
    /// Load configuration from environment variables.
    ///
    /// - `LARDER_LLM_PROVIDER`: "fake" | "claude" (default: "fake")
    /// - `LARDER_LLM_MODEL`: Model name (default: [`DEFAULT_CLAUDE_MODEL`])
    /// - `ANTHROPIC_API_KEY`: Required when the provider is "claude"
    /// - `LARDER_LLM_CACHE_DIR`: Cache directory (default: "~/.larder/llm-cache")
    /// - `LARDER_NUTRITION_PROVIDER`: "local" | "usda" (default: "local")
    /// - `LARDER_USDA_API_KEY` or `USDA_API_KEY`: Required for "usda" unless privacy mode is on
    /// - `LARDER_PRIVACY_MODE`: "true" or "1" forces the local nutrient table
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CoreConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let llm = LlmConfig::from_lookup(&lookup)?;

        let privacy_mode = lookup("LARDER_PRIVACY_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let backend = match lookup("LARDER_NUTRITION_PROVIDER").as_deref() {
            None | Some("local") => NutritionBackend::Local,
            Some("usda") => NutritionBackend::Usda,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "LARDER_NUTRITION_PROVIDER".to_string(),
                    value: other.to_string(),
                })
            }
        };
        let usda_api_key = lookup("LARDER_USDA_API_KEY").or_else(|| lookup("USDA_API_KEY"));
        if backend == NutritionBackend::Usda && !privacy_mode && usda_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("USDA_API_KEY".to_string()));
        }

        Ok(Self {
            llm,
            nutrition: NutritionConfig {
                backend,
                usda_api_key,
            },
            privacy_mode,
        })
    }
}

impl LlmConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("LARDER_LLM_PROVIDER").as_deref() {
            None | Some("fake") => LlmBackend::Fake,
            Some("claude") => LlmBackend::Claude,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "LARDER_LLM_PROVIDER".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let api_key = lookup("ANTHROPIC_API_KEY");
        if backend == LlmBackend::Claude && api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()));
        }

        let model = lookup("LARDER_LLM_MODEL").unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string());

        let cache_dir = lookup("LARDER_LLM_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_cache_dir);

        Ok(Self {
            backend,
            model,
            api_key,
            cache_dir,
        })
    }

    /// Get the default cache directory: ~/.larder/llm-cache
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".larder").join("llm-cache"))
            .unwrap_or_else(|| PathBuf::from(".cache/llm"))
    }
}
