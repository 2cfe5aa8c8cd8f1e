//! Nutrient profiles, lookup providers and recipe-level aggregation.
//!
//! Profiles are per 100 g. Lookups go through an injected [`NutrientProvider`]
//! so the caller decides between the embedded table and a remote
//! food-composition API.

mod aggregate;
pub mod providers;

pub use aggregate::{aggregate, IngredientInput, IngredientNutrition, RecipeNutritionResult};
pub use providers::{create_nutrient_provider, LocalTableProvider, UsdaProvider};

use std::fmt;
use std::ops::AddAssign;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unit_converter::round_to;

#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("Nutrient lookup failed: {0}")]
    RequestFailed(String),

    #[error("Nutrient provider returned {status}: {message}")]
    BadResponse { status: u16, message: String },

    #[error("Nutrient provider not configured: {0}")]
    NotConfigured(String),
}

/// Macro and micronutrients. Per 100 g when it comes from a provider, summed
/// when it comes out of aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sugar: f64,
    pub fiber: f64,
    pub sodium: f64,
}

/// Aggregated totals share the per-100 g shape.
pub type AggregatedNutrients = NutrientProfile;

impl NutrientProfile {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Apply `f` to every field.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            calories: f(self.calories),
            protein: f(self.protein),
            carbs: f(self.carbs),
            fat: f(self.fat),
            sugar: f(self.sugar),
            fiber: f(self.fiber),
            sodium: f(self.sodium),
        }
    }

    /// Nutrients for `grams` of a food with this per-100 g profile, at full precision.
    pub fn scaled(&self, grams: f64) -> Self {
        let factor = grams / 100.0;
        self.map(|value| value * factor)
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        self.map(|value| round_to(value, decimals))
    }

    /// Negative or non-finite values become zero.
    pub fn sanitized(&self) -> Self {
        self.map(|value| if value.is_finite() && value > 0.0 { value } else { 0.0 })
    }
}

impl AddAssign for NutrientProfile {
    fn add_assign(&mut self, other: Self) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.sugar += other.sugar;
        self.fiber += other.fiber;
        self.sodium += other.sodium;
    }
}

/// Source of per-100 g nutrient profiles.
#[async_trait]
pub trait NutrientProvider: Send + Sync + fmt::Debug {
    /// Profile for a canonical ingredient name, or `None` when unknown.
    async fn lookup(&self, canonical_name: &str) -> Result<Option<NutrientProfile>, NutritionError>;

    fn provider_name(&self) -> &'static str;
}

/// A profile together with its values for a specific mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionForQuantity {
    pub per_100g: NutrientProfile,
    pub for_quantity: NutrientProfile,
}

/// Look up one ingredient and scale it to `grams` (rounded to 2 decimals).
/// Without `grams` the quantity values equal the per-100 g values.
pub async fn nutrition_for_quantity(
    provider: &dyn NutrientProvider,
    canonical_name: &str,
    grams: Option<f64>,
) -> Result<Option<NutritionForQuantity>, NutritionError> {
    let Some(per_100g) = provider.lookup(canonical_name).await? else {
        return Ok(None);
    };
    let for_quantity = match grams {
        Some(grams) if grams > 0.0 && grams != 100.0 => per_100g.scaled(grams).rounded(2),
        _ => per_100g,
    };
    Ok(Some(NutritionForQuantity {
        per_100g,
        for_quantity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_keeps_precision() {
        let profile = NutrientProfile {
            calories: 333.0,
            ..Default::default()
        };
        assert!((profile.scaled(10.0).calories - 33.3).abs() < 1e-9);
        assert_eq!(profile.scaled(0.0).calories, 0.0);
    }

    #[test]
    fn test_add_assign_and_round() {
        let mut total = NutrientProfile::zero();
        total += NutrientProfile {
            protein: 1.005,
            ..Default::default()
        };
        total += NutrientProfile {
            protein: 2.0,
            fat: 0.333,
            ..Default::default()
        };
        let rounded = total.rounded(2);
        assert_eq!(rounded.fat, 0.33);
        assert!((rounded.protein - 3.0).abs() < 0.011);
    }

    #[test]
    fn test_sanitized() {
        let profile = NutrientProfile {
            calories: -1.0,
            fat: f64::NAN,
            protein: 3.0,
            ..Default::default()
        };
        let clean = profile.sanitized();
        assert_eq!(clean.calories, 0.0);
        assert_eq!(clean.fat, 0.0);
        assert_eq!(clean.protein, 3.0);
    }

    #[tokio::test]
    async fn test_nutrition_for_quantity() {
        let provider = LocalTableProvider::new();

        let result = nutrition_for_quantity(&provider, "peanut butter", Some(32.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.per_100g.calories, 588.0);
        assert_eq!(result.for_quantity.calories, 188.16);
        assert_eq!(result.for_quantity.sodium, 128.0);

        let result = nutrition_for_quantity(&provider, "peanut butter", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.for_quantity, result.per_100g);

        let missing = nutrition_for_quantity(&provider, "dragon fruit jam", Some(10.0))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
