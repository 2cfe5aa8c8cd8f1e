//! Model-backed ingredient substitutions, filtered against the allergen ontology.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::allergen::AllergenOntology;
use crate::llm::{json::extract_json, LlmError, LlmProvider, RunOptions};

/// Suggestions returned at most.
pub const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Error)]
pub enum SubstitutionError {
    #[error("Substitution request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse substitution suggestions: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstitutionGoal {
    #[serde(rename = "remove allergen")]
    RemoveAllergen,
    #[serde(rename = "reduce calories")]
    ReduceCalories,
    #[serde(rename = "make vegan")]
    MakeVegan,
    #[serde(rename = "preserve flavor")]
    PreserveFlavor,
}

impl SubstitutionGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveAllergen => "remove allergen",
            Self::ReduceCalories => "reduce calories",
            Self::MakeVegan => "make vegan",
            Self::PreserveFlavor => "preserve flavor",
        }
    }
}

impl fmt::Display for SubstitutionGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubstitutionGoal {
    type Err = String;

    /// Accepts the wire form and dashed or underscored variants.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "remove allergen" => Ok(Self::RemoveAllergen),
            "reduce calories" => Ok(Self::ReduceCalories),
            "make vegan" => Ok(Self::MakeVegan),
            "preserve flavor" | "preserve flavour" => Ok(Self::PreserveFlavor),
            _ => Err(format!("unknown substitution goal: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParams {
    pub ingredient: String,
    pub goal: SubstitutionGoal,
    #[serde(default)]
    pub user_allergens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine_context: Option<String>,
}

impl SuggestParams {
    pub fn new(ingredient: impl Into<String>, goal: SubstitutionGoal) -> Self {
        Self {
            ingredient: ingredient.into(),
            goal,
            user_allergens: Vec::new(),
            cuisine_context: None,
        }
    }
}

/// Nutrient deltas the model expects from the swap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggestion: String,
    /// Amount to use per 1 unit of the original.
    pub substitution_ratio: f64,
    #[serde(default)]
    pub impact_estimate: ImpactEstimate,
    #[serde(default)]
    pub reason: String,
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "minItems": MAX_SUGGESTIONS,
        "maxItems": MAX_SUGGESTIONS,
        "items": {
            "type": "object",
            "properties": {
                "suggestion": {"type": "string"},
                "substitutionRatio": {"type": "number"},
                "impactEstimate": {
                    "type": "object",
                    "properties": {
                        "calories": {"type": "number"},
                        "protein": {"type": "number"},
                        "carbs": {"type": "number"},
                        "fat": {"type": "number"}
                    }
                },
                "reason": {"type": "string"}
            },
            "required": ["suggestion", "substitutionRatio", "impactEstimate", "reason"]
        }
    })
}

pub fn build_substitution_prompt(params: &SuggestParams) -> String {
    let avoid = if params.user_allergens.is_empty() {
        String::new()
    } else {
        format!(
            "Do NOT suggest ingredients that contain or are derived from these allergens: {}.\n\n",
            json!(params.user_allergens)
        )
    };
    let cuisine = params
        .cuisine_context
        .as_ref()
        .map(|cuisine| format!(", cuisine={}", json!(cuisine)))
        .unwrap_or_default();

    format!(
        "You are an ingredient substitution assistant. Provide exactly {MAX_SUGGESTIONS} alternative \
         ingredient suggestions that satisfy the user's goal. Return a JSON array ({MAX_SUGGESTIONS} items) \
         that matches this JSON Schema:\n{schema}\n\n\
         {avoid}\
         Context: ingredient={ingredient}, goal={goal}{cuisine}.\n\n\
         Examples:\n\
         1) Ingredient: 'regular milk', goal: 'make vegan' -> suggestion: 'unsweetened soy milk', \
         substitutionRatio: 1.0, impactEstimate: {{calories: 33, protein: 3.3, carbs: 0.4, fat: 1.6}}, \
         reason: 'soy milk matches protein and mouthfeel'\n\n\
         Return JSON only.",
        schema = output_schema(),
        ingredient = json!(params.ingredient),
        goal = json!(params.goal.as_str()),
    )
}

/// Parse the model's suggestion array. Entries missing a name or ratio are skipped.
pub fn parse_suggestions(raw: &str) -> Result<Vec<Suggestion>, SubstitutionError> {
    let value = extract_json(raw).map_err(|e| SubstitutionError::Parse(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| SubstitutionError::Parse("expected a JSON array".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Suggestion>(item.clone()) {
            Ok(suggestion) => Some(suggestion),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed suggestion");
                None
            }
        })
        .collect())
}

/// Ask `provider` for substitutions and drop any that trip the user's allergens.
/// May return fewer than three.
pub async fn suggest_substitutions(
    provider: &dyn LlmProvider,
    ontology: &AllergenOntology,
    params: &SuggestParams,
) -> Result<Vec<Suggestion>, SubstitutionError> {
    let prompt = build_substitution_prompt(params);
    let options = RunOptions::with_response_constraint(json!({"type": "array"}));

    tracing::debug!(
        provider = provider.provider_name(),
        ingredient = %params.ingredient,
        goal = %params.goal,
        "requesting substitutions"
    );
    let raw = provider.run(&prompt, &options).await?;
    let suggestions = parse_suggestions(&raw)?;

    let avoid: Vec<String> = params
        .user_allergens
        .iter()
        .map(|name| {
            ontology
                .resolve_allergen_name(name)
                .unwrap_or_else(|| name.trim().to_lowercase())
        })
        .collect();

    Ok(suggestions
        .into_iter()
        .filter(|suggestion| {
            let conflicts: Vec<String> = ontology
                .allergens_for(&suggestion.suggestion, None)
                .into_iter()
                .filter(|allergen| avoid.contains(allergen))
                .collect();
            if !conflicts.is_empty() {
                tracing::debug!(
                    suggestion = %suggestion.suggestion,
                    ?conflicts,
                    "dropping suggestion that conflicts with user allergens"
                );
            }
            conflicts.is_empty()
        })
        .take(MAX_SUGGESTIONS)
        .collect())
}
