//! Model-backed allergen detection.
//!
//! Builds a self-contained prompt (schema plus worked examples), runs it through
//! an injected [`LlmProvider`] and parses the `{matches, safe}` payload. The
//! result feeds [`decide`](super::decide) as its model matches. An unreadable
//! response is a hard error, never an empty result.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::decision::ModelMatch;
use crate::llm::{json::extract_json, LlmError, LlmProvider, RunOptions};

/// Parsed model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenDetection {
    pub matches: Vec<ModelMatch>,
    pub safe: bool,
}

/// The prompt that was sent and the parsed detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub prompt: String,
    pub detection: AllergenDetection,
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "matches": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "ingredient": {"type": "string"},
                        "allergen": {"type": "string"},
                        "confidence": {"type": "number", "minimum": 0, "maximum": 100},
                        "reason": {"type": "string"}
                    },
                    "required": ["ingredient", "allergen", "confidence", "reason"]
                }
            },
            "safe": {"type": "boolean"}
        },
        "required": ["matches", "safe"]
    })
}

fn worked_examples() -> serde_json::Value {
    json!([
        {
            "ingredients": ["butter (dairy)", "wheat flour", "almond milk"],
            "allergies": ["tree-nut", "dairy"],
            "output": {
                "matches": [
                    {"ingredient": "butter (dairy)", "allergen": "dairy", "confidence": 95, "reason": "explicit dairy product"},
                    {"ingredient": "almond milk", "allergen": "tree-nut", "confidence": 98, "reason": "almond is a tree nut"}
                ],
                "safe": false
            }
        },
        {
            "ingredients": ["brown rice", "olive oil", "salt"],
            "allergies": ["gluten"],
            "output": {"matches": [], "safe": true}
        },
        {
            "ingredients": ["peanut butter", "soy sauce", "sesame oil", "egg yolk", "mustard seeds", "lupin flour", "shrimp"],
            "allergies": ["peanut", "soy", "sesame", "egg", "mustard", "lupin", "shellfish"],
            "output": {
                "matches": [
                    {"ingredient": "peanut butter", "allergen": "peanut", "confidence": 99, "reason": "contains peanuts"},
                    {"ingredient": "soy sauce", "allergen": "soy", "confidence": 95, "reason": "soy-based condiment"},
                    {"ingredient": "sesame oil", "allergen": "sesame", "confidence": 95, "reason": "derived from sesame seeds"},
                    {"ingredient": "egg yolk", "allergen": "egg", "confidence": 98, "reason": "egg product"},
                    {"ingredient": "mustard seeds", "allergen": "mustard", "confidence": 99, "reason": "mustard seed"},
                    {"ingredient": "lupin flour", "allergen": "lupin", "confidence": 99, "reason": "lupin bean product"},
                    {"ingredient": "shrimp", "allergen": "shellfish", "confidence": 99, "reason": "crustacean"}
                ],
                "safe": false
            }
        }
    ])
}

/// Build the detection prompt for a set of canonical ingredients.
pub fn build_allergen_prompt(
    canonical_ingredients: &[impl AsRef<str>],
    user_allergens: &[impl AsRef<str>],
) -> String {
    let ingredients: Vec<&str> = canonical_ingredients.iter().map(|s| s.as_ref()).collect();
    let allergies: Vec<&str> = user_allergens.iter().map(|s| s.as_ref()).collect();

    let examples = worked_examples()
        .as_array()
        .map(|examples| {
            examples
                .iter()
                .map(|example| {
                    format!(
                        "Ingredients: {}\nAllergies: {}\nOutput: {}",
                        example["ingredients"], example["allergies"], example["output"]
                    )
                })
                .collect::<Vec<_>>()
                .join("\n---\n")
        })
        .unwrap_or_default();

    format!(
        "You are an allergen detection assistant. Given a list of canonical ingredient names and a \
         user's allergy profile (list of allergen categories), identify which ingredients are likely \
         to match the user's allergies. Use conservative, evidence-based reasoning and include a \
         numeric confidence (0-100) and a short reason for each match.\n\n\
         Return a single JSON object with the described schema.\n\n\
         Common mappings (ingredient -> allergen): peanut -> peanut, almond/almond milk -> tree-nut, \
         wheat/flour -> gluten, milk/butter/cheese -> dairy, soy/soy sauce -> soy, \
         shrimp/crab/lobster -> shellfish, egg/egg yolk -> egg, sesame/sesame oil -> sesame, \
         mustard/mustard seeds -> mustard, lupin/lupin flour -> lupin.\n\n\
         Provide the output as JSON that matches this schema:\n{schema}\n\n\
         Examples:\n{examples}\n---\n\
         Now analyze the following input:\n\
         Ingredients: {ingredients}\n\
         Allergies: {allergies}\n\
         Provide the JSON output only.",
        schema = output_schema(),
        ingredients = json!(ingredients),
        allergies = json!(allergies),
    )
}

/// Run allergen detection through `provider`.
pub async fn detect_allergens(
    provider: &dyn LlmProvider,
    canonical_ingredients: &[impl AsRef<str> + Sync],
    user_allergens: &[impl AsRef<str> + Sync],
) -> Result<DetectionOutcome, LlmError> {
    let prompt = build_allergen_prompt(canonical_ingredients, user_allergens);
    let options = RunOptions::with_response_constraint(json!({
        "type": "object",
        "properties": {
            "matches": {"type": "array"},
            "safe": {"type": "boolean"}
        }
    }));

    tracing::debug!(
        provider = provider.provider_name(),
        ingredients = canonical_ingredients.len(),
        "running allergen detection"
    );
    let raw = provider.run(&prompt, &options).await?;
    let detection = parse_detection(&raw)?;

    Ok(DetectionOutcome { prompt, detection })
}

/// Parse a detection payload, coercing loosely typed fields.
///
/// A missing or non-array `matches` reads as no matches, and `safe` is false
/// unless it is literally `true`.
pub fn parse_detection(raw: &str) -> Result<AllergenDetection, LlmError> {
    let value = extract_json(raw)?;
    let object = value.as_object().ok_or_else(|| {
        LlmError::ParseError("allergen detection payload is not a JSON object".to_string())
    })?;

    let matches = object
        .get("matches")
        .and_then(|matches| matches.as_array())
        .map(|matches| matches.iter().filter_map(coerce_match).collect())
        .unwrap_or_default();
    let safe = object
        .get("safe")
        .and_then(|safe| safe.as_bool())
        .unwrap_or(false);

    Ok(AllergenDetection { matches, safe })
}

fn coerce_match(value: &serde_json::Value) -> Option<ModelMatch> {
    let text = |key: &str| -> Option<String> {
        match value.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    };

    let confidence = match value.get("confidence") {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };

    Some(ModelMatch {
        ingredient: text("ingredient")?,
        allergen: text("allergen")?,
        confidence,
        reason: text("reason").filter(|reason| !reason.is_empty()),
    })
}
