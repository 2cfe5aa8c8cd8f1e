//! Locale-specific common names for canonical ingredients.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::llm::{json::parse_json, LlmError, LlmProvider, RunOptions};

pub const DEFAULT_LOCALE: &str = "en-us";

pub const DICTIONARY_CONFIDENCE: f64 = 0.99;
pub const TRANSLATOR_CONFIDENCE: f64 = 0.65;
pub const FALLBACK_CONFIDENCE: f64 = 0.35;

type Dictionary = HashMap<String, String>;

static DICTIONARIES: LazyLock<HashMap<String, Dictionary>> = LazyLock::new(|| {
    let json = include_str!("../data/localization.json");
    let mut dictionaries: HashMap<String, Dictionary> =
        serde_json::from_str(json).expect("localization.json should be valid JSON");
    if let Some(uk) = dictionaries.get("en-uk").cloned() {
        dictionaries.insert("en-gb".to_string(), uk);
    }
    dictionaries
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalizationSource {
    Dictionary,
    Translator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationResult {
    pub local_name: String,
    pub confidence: f64,
    pub source: LocalizationSource,
}

/// Fallback for names missing from the dictionaries.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_locale: &str) -> Result<String, LlmError>;
}

/// Translates through a text-generation provider.
#[derive(Debug)]
pub struct LlmTranslator<'a> {
    provider: &'a dyn LlmProvider,
}

impl<'a> LlmTranslator<'a> {
    pub fn new(provider: &'a dyn LlmProvider) -> Self {
        Self { provider }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatorReply {
    local_name: String,
}

pub fn build_localization_prompt(text: &str, target_locale: &str) -> String {
    format!(
        "You are an ingredient localization assistant. Give the common grocery-store name used in \
         the locale {locale} for the ingredient {text}. Keep it short and do not add quantities.\n\n\
         Example: ingredient \"eggplant\", locale \"en-uk\" -> {{\"localName\": \"aubergine\"}}\n\n\
         Return JSON only, in the form {{\"localName\": \"...\"}}.",
        locale = json!(target_locale),
        text = json!(text),
    )
}

#[async_trait]
impl Translator for LlmTranslator<'_> {
    async fn translate(&self, text: &str, target_locale: &str) -> Result<String, LlmError> {
        let prompt = build_localization_prompt(text, target_locale);
        let options = RunOptions::with_response_constraint(json!({
            "type": "object",
            "properties": {"localName": {"type": "string"}},
            "required": ["localName"]
        }));
        let raw = self.provider.run(&prompt, &options).await?;
        let reply: TranslatorReply = parse_json(&raw)?;
        let name = reply.local_name.trim();
        if name.is_empty() {
            return Err(LlmError::ParseError("empty localName".to_string()));
        }
        Ok(name.to_string())
    }
}

/// Dictionary for `locale`, falling back to its language prefix, then `en-us`.
fn dictionary_for(locale: &str) -> Option<&'static Dictionary> {
    let locale = locale.trim().to_lowercase().replace('_', "-");
    let language = locale.split('-').next().unwrap_or_default();
    DICTIONARIES
        .get(&locale)
        .or_else(|| DICTIONARIES.get(language))
        .or_else(|| DICTIONARIES.get(DEFAULT_LOCALE))
}

/// Dictionary-only lookup.
pub fn dictionary_name(canonical_name: &str, locale: &str) -> Option<&'static str> {
    let key = canonical_name.trim().to_lowercase();
    dictionary_for(locale)?.get(&key).map(String::as_str)
}

/// Localize `canonical_name` for `locale`: dictionary first, then `translator`,
/// then the name unchanged at low confidence.
pub async fn localize(
    canonical_name: &str,
    locale: &str,
    translator: Option<&dyn Translator>,
) -> LocalizationResult {
    let locale = if locale.trim().is_empty() {
        DEFAULT_LOCALE
    } else {
        locale
    };

    if let Some(local_name) = dictionary_name(canonical_name, locale) {
        return LocalizationResult {
            local_name: local_name.to_string(),
            confidence: DICTIONARY_CONFIDENCE,
            source: LocalizationSource::Dictionary,
        };
    }

    if let Some(translator) = translator {
        match translator.translate(canonical_name, locale).await {
            Ok(local_name) => {
                return LocalizationResult {
                    local_name,
                    confidence: TRANSLATOR_CONFIDENCE,
                    source: LocalizationSource::Translator,
                }
            }
            Err(e) => {
                tracing::warn!(
                    ingredient = %canonical_name,
                    locale,
                    error = %e,
                    "translator failed, keeping canonical name"
                );
            }
        }
    }

    LocalizationResult {
        local_name: canonical_name.to_string(),
        confidence: FALLBACK_CONFIDENCE,
        source: LocalizationSource::Translator,
    }
}
