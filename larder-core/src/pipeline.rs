//! End-to-end analysis of a recipe's ingredient lines.
//!
//! raw lines -> normalize -> parse -> {convert, canonicalize} -> {decide, aggregate}

use serde::{Deserialize, Serialize};

use crate::allergen::{decide, detect_allergens, Alert, AllergenOntology, DecisionResult};
use crate::canonicalizer::canonicalize;
use crate::ingredient_parser::{parse_ingredient, ParsedIngredient};
use crate::llm::{LlmError, LlmProvider};
use crate::normalize::normalize;
use crate::nutrition::{aggregate, IngredientInput, NutrientProvider, RecipeNutritionResult};
use crate::unit_converter::{convert, ConversionResult, DensityOverrides};

/// Collaborators and user settings for one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    pub ontology: &'a AllergenOntology,
    pub nutrients: &'a dyn NutrientProvider,
    /// When set together with `user_allergens`, model matches are requested.
    pub llm: Option<&'a dyn LlmProvider>,
    pub user_allergens: Vec<String>,
    pub region: Option<String>,
    pub density_overrides: Option<DensityOverrides>,
}

impl<'a> AnalysisContext<'a> {
    /// Global ontology, no model, no user settings.
    pub fn new(nutrients: &'a dyn NutrientProvider) -> Self {
        Self {
            ontology: AllergenOntology::global(),
            nutrients,
            llm: None,
            user_allergens: Vec::new(),
            region: None,
            density_overrides: None,
        }
    }

    pub fn with_llm(mut self, llm: &'a dyn LlmProvider) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_user_allergens(mut self, allergens: Vec<String>) -> Self {
        self.user_allergens = allergens;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_density_overrides(mut self, overrides: DensityOverrides) -> Self {
        self.density_overrides = Some(overrides);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedIngredient {
    /// The normalized line.
    pub line: String,
    pub parsed: ParsedIngredient,
    pub conversion: ConversionResult,
    pub canonical_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAnalysis {
    pub ingredients: Vec<AnalyzedIngredient>,
    pub allergens: DecisionResult,
    /// Alerts restricted to the user's declared allergens.
    pub user_alerts: Vec<Alert>,
    pub nutrition: RecipeNutritionResult,
}

fn analyze_line(line: String, overrides: Option<&DensityOverrides>) -> AnalyzedIngredient {
    let parsed = parse_ingredient(&line);
    let conversion = convert(&parsed, overrides);
    let canonical_name = canonicalize(&line).canonical_name;
    AnalyzedIngredient {
        line,
        parsed,
        conversion,
        canonical_name,
    }
}

/// Mass entering aggregation. Unconvertible lines count as 0 g, and anything
/// the converter was unsure about is flagged as estimated.
fn nutrition_input(ingredient: &AnalyzedIngredient) -> IngredientInput {
    let conversion = &ingredient.conversion;
    IngredientInput {
        canonical_name: ingredient.canonical_name.clone(),
        grams: conversion.grams.unwrap_or(0.0),
        estimated: conversion.grams.is_none() || conversion.uncertain,
    }
}

/// Analyze raw ingredient lines.
///
/// Only the model call can fail; nutrient provider errors are absorbed into
/// `nutrition.uncertain`.
pub async fn analyze_recipe(
    lines: &[impl AsRef<str>],
    servings: f64,
    ctx: &AnalysisContext<'_>,
) -> Result<RecipeAnalysis, LlmError> {
    let ingredients: Vec<AnalyzedIngredient> = normalize(lines)
        .into_iter()
        .map(|line| analyze_line(line, ctx.density_overrides.as_ref()))
        .collect();

    let canonical_names: Vec<&str> = ingredients
        .iter()
        .map(|ingredient| ingredient.canonical_name.as_str())
        .collect();

    let model_matches = match ctx.llm {
        Some(provider) if !ctx.user_allergens.is_empty() => {
            detect_allergens(provider, &canonical_names, &ctx.user_allergens)
                .await?
                .detection
                .matches
        }
        _ => Vec::new(),
    };

    let allergens = decide(
        ctx.ontology,
        &canonical_names,
        &model_matches,
        ctx.region.as_deref(),
    );
    let user_alerts = allergens
        .alerts_for(&ctx.user_allergens)
        .into_iter()
        .cloned()
        .collect();

    let inputs: Vec<IngredientInput> = ingredients.iter().map(nutrition_input).collect();
    let nutrition = aggregate(ctx.nutrients, &inputs, servings).await;

    tracing::debug!(
        ingredients = ingredients.len(),
        alerts = allergens.alerts.len(),
        model_matches = model_matches.len(),
        uncertain = nutrition.uncertain,
        "analyzed recipe"
    );

    Ok(RecipeAnalysis {
        ingredients,
        allergens,
        user_alerts,
        nutrition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allergen::{AlertSource, OverallSafety};
    use crate::llm::FakeProvider;
    use crate::nutrition::LocalTableProvider;

    const PEANUT_NOODLES: &[&str] = &[
        "• 2 tbsp <b>peanut butter</b>",
        "1 cup water",
        "3 tbsp soy sauce",
        "salt, to taste",
        "",
    ];

    #[tokio::test]
    async fn test_analyze_recipe() {
        let provider = LocalTableProvider::new();
        let ctx = AnalysisContext::new(&provider);
        let analysis = analyze_recipe(PEANUT_NOODLES, 2.0, &ctx).await.unwrap();

        let lines: Vec<&str> = analysis.ingredients.iter().map(|i| i.line.as_str()).collect();
        assert_eq!(lines, vec!["2 tbsp peanut butter", "1 cup water", "3 tbsp soy sauce", "salt"]);

        let water = &analysis.ingredients[1];
        assert_eq!(water.conversion.grams, Some(240.0));
        assert_eq!(water.canonical_name, "water");

        assert_eq!(analysis.allergens.overall_safety, OverallSafety::Unsafe);
        let allergens: Vec<&str> = analysis
            .allergens
            .alerts
            .iter()
            .map(|alert| alert.allergen.as_str())
            .collect();
        assert!(allergens.contains(&"peanut"));
        assert!(allergens.contains(&"soy"));

        assert_eq!(analysis.ingredients[0].conversion.grams, Some(28.0));
        // Soy sauce has no known density.
        assert!(analysis.ingredients[2].conversion.grams.is_none());
        assert!(analysis.nutrition.uncertain);
        let salt = analysis.nutrition.per_ingredient.last().unwrap();
        assert_eq!(salt.input.grams, 0.0);
        assert!(salt.input.estimated);
    }

    #[tokio::test]
    async fn test_density_overrides_feed_nutrition() {
        let provider = LocalTableProvider::new();
        let mut overrides = DensityOverrides::new();
        overrides.insert("peanut butter".to_string(), 1.08);
        let ctx = AnalysisContext::new(&provider).with_density_overrides(overrides);

        let analysis = analyze_recipe(&["2 tbsp peanut butter"], 1.0, &ctx)
            .await
            .unwrap();
        assert_eq!(analysis.ingredients[0].conversion.grams, Some(32.0));
        assert!(!analysis.nutrition.uncertain);
        assert_eq!(analysis.nutrition.total_nutrients.calories, 188.16);
    }

    #[tokio::test]
    async fn test_model_matches_are_merged() {
        let nutrients = LocalTableProvider::new();
        let llm = FakeProvider::with_response(
            "allergen detection assistant",
            r#"{"matches": [
                {"ingredient": "almond milk", "allergen": "tree-nut", "confidence": 85, "reason": "almonds"},
                {"ingredient": "mystery paste", "allergen": "sesame", "confidence": 40, "reason": "maybe tahini"}
            ], "safe": false}"#,
        );
        let ctx = AnalysisContext::new(&nutrients)
            .with_llm(&llm)
            .with_user_allergens(vec!["tree-nut".to_string()]);

        let analysis = analyze_recipe(&["1 cup almond milk", "1 tbsp mystery paste"], 2.0, &ctx)
            .await
            .unwrap();

        let almond = &analysis.allergens.alerts[0];
        assert_eq!(almond.source, AlertSource::Both);
        assert!(almond.confidence >= 95);

        let mystery = &analysis.allergens.alerts[1];
        assert_eq!(mystery.source, AlertSource::Model);
        assert_eq!(mystery.confidence, 40);

        assert_eq!(analysis.user_alerts.len(), 1);
        assert_eq!(analysis.user_alerts[0].allergen, "tree-nut");
    }

    #[tokio::test]
    async fn test_unreadable_model_output_fails() {
        let nutrients = LocalTableProvider::new();
        let llm = FakeProvider::with_response("allergen detection assistant", "I cannot help");
        let ctx = AnalysisContext::new(&nutrients)
            .with_llm(&llm)
            .with_user_allergens(vec!["peanut".to_string()]);

        let result = analyze_recipe(&["1 cup peanuts"], 1.0, &ctx).await;
        assert!(matches!(result, Err(LlmError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_model_skipped_without_user_allergens() {
        let nutrients = LocalTableProvider::new();
        let llm = FakeProvider::new();
        let ctx = AnalysisContext::new(&nutrients).with_llm(&llm);
        let analysis = analyze_recipe(&["1 cup peanuts"], 1.0, &ctx).await.unwrap();
        assert_eq!(analysis.allergens.alerts[0].source, AlertSource::Ontology);
    }
}
