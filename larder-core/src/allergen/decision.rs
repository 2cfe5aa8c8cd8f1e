//! Merges ontology lookups with model-reported matches into ranked alerts and
//! an overall safety verdict.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ontology::{normalize_input, AllergenOntology};

/// Confidence assigned to every ontology match.
pub const ONTOLOGY_CONFIDENCE: u8 = 95;

pub const UNSAFE_THRESHOLD: u8 = 90;
pub const WARNING_THRESHOLD: u8 = 60;

/// A match reported by an external model. Never produced by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMatch {
    pub ingredient: String,
    pub allergen: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSource {
    Ontology,
    Model,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub ingredient: String,
    pub allergen: String,
    pub source: AlertSource,
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSafety {
    Safe,
    Warning,
    Unsafe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub alerts: Vec<Alert>,
    pub overall_safety: OverallSafety,
}

impl DecisionResult {
    /// Alerts whose allergen is one of the user's declared categories.
    pub fn alerts_for<'a>(&'a self, user_allergens: &[impl AsRef<str>]) -> Vec<&'a Alert> {
        let wanted: Vec<String> = user_allergens
            .iter()
            .map(|allergen| normalize_input(allergen.as_ref()))
            .collect();
        self.alerts
            .iter()
            .filter(|alert| wanted.contains(&normalize_input(&alert.allergen)))
            .collect()
    }
}

/// Decide allergen alerts for a list of canonical ingredient names.
///
/// Every ontology category yields an alert: `Both` when a model match names
/// the same allergen for the same ingredient, otherwise `Ontology` at fixed
/// confidence. Model matches only stand alone for ingredients the ontology
/// knows nothing about.
pub fn decide(
    ontology: &AllergenOntology,
    canonical_ingredients: &[impl AsRef<str>],
    model_matches: &[ModelMatch],
    region: Option<&str>,
) -> DecisionResult {
    let mut model_index: HashMap<String, Vec<&ModelMatch>> = HashMap::new();
    for model_match in model_matches {
        model_index
            .entry(normalize_input(&model_match.ingredient))
            .or_default()
            .push(model_match);
    }

    let mut alerts = Vec::new();
    for ingredient in canonical_ingredients {
        let ingredient = ingredient.as_ref();
        let categories = ontology.allergens_for(ingredient, region);
        let models = model_index
            .get(&normalize_input(ingredient))
            .map(Vec::as_slice)
            .unwrap_or_default();

        if categories.is_empty() {
            alerts.extend(models.iter().map(|model_match| Alert {
                ingredient: model_match.ingredient.clone(),
                allergen: model_match.allergen.clone(),
                source: AlertSource::Model,
                confidence: clamp_confidence(model_match.confidence),
                reason: model_match.reason.clone(),
            }));
            continue;
        }

        for category in categories {
            let agreeing = models
                .iter()
                .find(|model_match| names_category(ontology, &model_match.allergen, &category));
            let alert = match agreeing {
                Some(model_match) => Alert {
                    ingredient: ingredient.to_string(),
                    allergen: category,
                    source: AlertSource::Both,
                    confidence: combined_confidence(model_match.confidence),
                    reason: model_match.reason.clone(),
                },
                None => Alert {
                    ingredient: ingredient.to_string(),
                    allergen: category,
                    source: AlertSource::Ontology,
                    confidence: ONTOLOGY_CONFIDENCE,
                    reason: Some("ontology match".to_string()),
                },
            };
            alerts.push(alert);
        }
    }

    let overall_safety = overall_safety(&alerts);
    DecisionResult {
        alerts,
        overall_safety,
    }
}

/// Ontology alerts are never downgraded; otherwise the strongest confidence decides.
pub fn overall_safety(alerts: &[Alert]) -> OverallSafety {
    if alerts
        .iter()
        .any(|alert| alert.source == AlertSource::Ontology)
    {
        OverallSafety::Unsafe
    } else if alerts
        .iter()
        .any(|alert| alert.confidence >= UNSAFE_THRESHOLD)
    {
        OverallSafety::Unsafe
    } else if alerts
        .iter()
        .any(|alert| alert.confidence >= WARNING_THRESHOLD)
    {
        OverallSafety::Warning
    } else {
        OverallSafety::Safe
    }
}

/// Confidence when ontology and model agree. Never below the ontology's own.
fn combined_confidence(model_confidence: f64) -> u8 {
    let model = f64::from(clamp_confidence(model_confidence));
    let mean = ((f64::from(ONTOLOGY_CONFIDENCE) + model) / 2.0).round();
    mean.max(f64::from(ONTOLOGY_CONFIDENCE)).min(100.0) as u8
}

fn clamp_confidence(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    confidence.round().clamp(0.0, 100.0) as u8
}

fn names_category(ontology: &AllergenOntology, allergen: &str, category: &str) -> bool {
    normalize_input(allergen) == category
        || ontology.resolve_allergen_name(allergen).as_deref() == Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(ingredient: &str, allergen: &str, confidence: f64) -> ModelMatch {
        ModelMatch {
            ingredient: ingredient.to_string(),
            allergen: allergen.to_string(),
            confidence,
            reason: Some("model reason".to_string()),
        }
    }

    fn run(ingredients: &[&str], matches: &[ModelMatch]) -> DecisionResult {
        decide(AllergenOntology::global(), ingredients, matches, Some("us"))
    }

    #[test]
    fn test_ontology_only() {
        let result = run(&["peanut butter"], &[]);
        assert_eq!(result.alerts.len(), 1);
        let alert = &result.alerts[0];
        assert_eq!(alert.source, AlertSource::Ontology);
        assert_eq!(alert.allergen, "peanut");
        assert_eq!(alert.confidence, ONTOLOGY_CONFIDENCE);
        assert_eq!(alert.reason.as_deref(), Some("ontology match"));
        assert_eq!(result.overall_safety, OverallSafety::Unsafe);
    }

    #[test]
    fn test_both_sources_agree() {
        let result = run(&["almond milk"], &[model("almond milk", "tree-nut", 85.0)]);
        assert_eq!(result.alerts.len(), 1);
        let alert = &result.alerts[0];
        assert_eq!(alert.source, AlertSource::Both);
        assert_eq!(alert.confidence, 95);
        assert_eq!(alert.reason.as_deref(), Some("model reason"));
        assert_eq!(result.overall_safety, OverallSafety::Unsafe);
    }

    #[test]
    fn test_both_confidence_formula() {
        assert_eq!(combined_confidence(0.0), 95);
        assert_eq!(combined_confidence(85.0), 95);
        assert_eq!(combined_confidence(99.0), 97);
        assert_eq!(combined_confidence(100.0), 98);
        assert_eq!(combined_confidence(250.0), 98);
    }

    #[test]
    fn test_model_names_allergen_loosely() {
        let result = run(&["Almond Milk"], &[model("almond milk", "Tree Nut", 99.0)]);
        assert_eq!(result.alerts[0].source, AlertSource::Both);
        assert_eq!(result.alerts[0].ingredient, "Almond Milk");
    }

    #[test]
    fn test_model_disagreement_keeps_ontology_alert() {
        let result = run(&["peanut butter"], &[model("peanut butter", "dairy", 20.0)]);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].source, AlertSource::Ontology);
        assert_eq!(result.overall_safety, OverallSafety::Unsafe);
    }

    #[test]
    fn test_model_only_thresholds() {
        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", 75.0)]);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].source, AlertSource::Model);
        assert_eq!(result.alerts[0].confidence, 75);
        assert_eq!(result.overall_safety, OverallSafety::Warning);

        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", 92.4)]);
        assert_eq!(result.overall_safety, OverallSafety::Unsafe);

        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", 30.0)]);
        assert_eq!(result.overall_safety, OverallSafety::Safe);
        assert_eq!(result.alerts.len(), 1);
    }

    #[test]
    fn test_model_confidence_is_clamped() {
        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", 140.0)]);
        assert_eq!(result.alerts[0].confidence, 100);
        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", -5.0)]);
        assert_eq!(result.alerts[0].confidence, 0);
        let result = run(&["mystery sauce"], &[model("mystery sauce", "soy", f64::NAN)]);
        assert_eq!(result.alerts[0].confidence, 0);
    }

    #[test]
    fn test_model_match_for_other_ingredient_is_ignored() {
        let result = run(&["rice"], &[model("mystery sauce", "soy", 99.0)]);
        assert!(result.alerts.is_empty());
        assert_eq!(result.overall_safety, OverallSafety::Safe);
    }

    #[test]
    fn test_alerts_for_user_allergens() {
        let result = run(&["peanut butter", "wheat flour", "butter (dairy)"], &[]);
        assert_eq!(result.alerts.len(), 3);
        let mine = result.alerts_for(&["Gluten", "dairy"]);
        let allergens: Vec<&str> = mine.iter().map(|alert| alert.allergen.as_str()).collect();
        assert_eq!(allergens, vec!["gluten", "dairy"]);
    }

    #[test]
    fn test_serialized_shape() {
        let result = run(&["peanut butter"], &[]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overallSafety"], "unsafe");
        assert_eq!(json["alerts"][0]["source"], "ontology");
    }
}
