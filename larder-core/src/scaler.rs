//! Rescale a recipe to a new serving count or calorie target.

use serde::{Deserialize, Serialize};

use crate::nutrition::{aggregate, AggregatedNutrients, IngredientInput, NutrientProvider};
use crate::unit_converter::round_to;

/// Differences below this are float noise, not rounding.
const ROUNDING_EPSILON: f64 = 1e-6;

/// `new_servings_count` wins when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_servings_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_calories_per_serving: Option<f64>,
}

impl ScaleOptions {
    pub fn to_servings(count: f64) -> Self {
        Self {
            new_servings_count: Some(count),
            ..Default::default()
        }
    }

    pub fn to_calories_per_serving(calories: f64) -> Self {
        Self {
            target_calories_per_serving: Some(calories),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledIngredient {
    /// The ingredient with `grams` replaced by the display-rounded mass.
    #[serde(flatten)]
    pub input: IngredientInput,
    pub original_grams: f64,
    pub scaled_grams_exact: f64,
    pub scaled_grams_rounded: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResult {
    pub ingredients_scaled: Vec<ScaledIngredient>,
    pub total_nutrients: AggregatedNutrients,
    pub per_serving_nutrients: AggregatedNutrients,
    pub scale_factor: f64,
}

/// Round a mass for display: whole grams from 10 g, half grams from 1 g,
/// tenths below that.
pub fn round_grams(grams: f64) -> f64 {
    if !grams.is_finite() {
        grams
    } else if grams >= 10.0 {
        grams.round()
    } else if grams >= 1.0 {
        (grams * 2.0).round() / 2.0
    } else {
        (grams * 10.0).round() / 10.0
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn scale_ingredient(input: &IngredientInput, factor: f64) -> ScaledIngredient {
    let exact = input.grams * factor;
    let rounded = round_grams(exact);
    let rounding_note = ((exact - rounded).abs() > ROUNDING_EPSILON).then(|| {
        format!(
            "Rounded from {} g to {} g for display",
            round_to(exact, 3),
            rounded
        )
    });

    ScaledIngredient {
        input: IngredientInput {
            grams: rounded,
            ..input.clone()
        },
        original_grams: input.grams,
        scaled_grams_exact: exact,
        scaled_grams_rounded: rounded,
        rounding_note,
    }
}

/// Scale `inputs` from `current_servings` according to `options`.
///
/// Nutrition is recomputed from the rounded masses rather than multiplied, so
/// the totals match what the user will actually measure out.
pub async fn scale(
    provider: &dyn NutrientProvider,
    inputs: &[IngredientInput],
    current_servings: f64,
    options: ScaleOptions,
) -> ScaleResult {
    let current_servings = positive(Some(current_servings)).unwrap_or(1.0);
    let new_servings = positive(options.new_servings_count);

    let mut factor = if let Some(new_servings) = new_servings {
        new_servings / current_servings
    } else if let Some(target) = positive(options.target_calories_per_serving) {
        let baseline = aggregate(provider, inputs, current_servings).await;
        let current_calories = baseline.per_serving_nutrients.calories;
        if current_calories > 0.0 {
            target / current_calories
        } else {
            tracing::debug!("no baseline calories, leaving recipe unscaled");
            1.0
        }
    } else {
        1.0
    };

    if !factor.is_finite() || factor <= 0.0 {
        factor = 1.0;
    }

    let ingredients_scaled: Vec<ScaledIngredient> = inputs
        .iter()
        .map(|input| scale_ingredient(input, factor))
        .collect();

    let effective_servings =
        new_servings.unwrap_or_else(|| (current_servings * factor).round().max(1.0));

    let rounded_inputs: Vec<IngredientInput> = ingredients_scaled
        .iter()
        .map(|scaled| scaled.input.clone())
        .collect();
    let nutrition = aggregate(provider, &rounded_inputs, effective_servings).await;

    tracing::debug!(
        scale_factor = factor,
        servings = effective_servings,
        ingredients = ingredients_scaled.len(),
        "scaled recipe"
    );

    ScaleResult {
        ingredients_scaled,
        total_nutrients: nutrition.total_nutrients,
        per_serving_nutrients: nutrition.per_serving_nutrients,
        scale_factor: factor,
    }
}
