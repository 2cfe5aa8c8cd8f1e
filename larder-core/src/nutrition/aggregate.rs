use serde::{Deserialize, Serialize};

use super::{AggregatedNutrients, NutrientProfile, NutrientProvider};
use crate::unit_converter::round_to;

/// One ingredient entering aggregation, already resolved to a mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInput {
    pub canonical_name: String,
    pub grams: f64,
    /// Mass was guessed rather than measured.
    #[serde(default)]
    pub estimated: bool,
}

impl IngredientInput {
    pub fn new(canonical_name: impl Into<String>, grams: f64) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            grams,
            estimated: false,
        }
    }

    pub fn estimated(mut self) -> Self {
        self.estimated = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientNutrition {
    pub input: IngredientInput,
    /// `None` when the provider had no data or failed.
    pub nutrients: Option<NutrientProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeNutritionResult {
    pub total_nutrients: AggregatedNutrients,
    pub per_serving_nutrients: AggregatedNutrients,
    pub uncertain: bool,
    pub per_ingredient: Vec<IngredientNutrition>,
}

/// Sum the nutrients of every input and divide by `servings`.
///
/// Lookups run one ingredient at a time so a rate-limited provider sees a
/// steady trickle instead of a burst. Provider errors are logged and the
/// ingredient is counted as missing. Totals accumulate unrounded; only the
/// reported values are rounded to 2 decimals.
pub async fn aggregate(
    provider: &dyn NutrientProvider,
    inputs: &[IngredientInput],
    servings: f64,
) -> RecipeNutritionResult {
    let mut total = NutrientProfile::zero();
    let mut uncertain = false;
    let mut per_ingredient = Vec::with_capacity(inputs.len());

    for input in inputs {
        let profile = match provider.lookup(&input.canonical_name).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::debug!(
                    ingredient = %input.canonical_name,
                    provider = provider.provider_name(),
                    "no nutrient data"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    ingredient = %input.canonical_name,
                    provider = provider.provider_name(),
                    error = %e,
                    "nutrient lookup failed"
                );
                None
            }
        };

        let grams = if input.grams.is_finite() && input.grams > 0.0 {
            input.grams
        } else {
            0.0
        };

        let nutrients = profile.map(|profile| {
            let amount = profile.sanitized().scaled(grams);
            total += amount;
            amount.rounded(2)
        });

        if nutrients.is_none() || input.estimated {
            uncertain = true;
        }

        per_ingredient.push(IngredientNutrition {
            input: input.clone(),
            nutrients,
        });
    }

    let per_serving_nutrients = if servings.is_finite() && servings > 0.0 {
        total.map(|value| round_to(value / servings, 2))
    } else {
        NutrientProfile::zero()
    };

    RecipeNutritionResult {
        total_nutrients: total.rounded(2),
        per_serving_nutrients,
        uncertain,
        per_ingredient,
    }
}
