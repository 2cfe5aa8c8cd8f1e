//! USDA FoodData Central search provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::nutrition::{NutrientProfile, NutrientProvider, NutritionError};

const SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";

/// Looks up the first search hit for a canonical name.
#[derive(Debug)]
pub struct UsdaProvider {
    api_key: String,
    client: reqwest::Client,
}

impl UsdaProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FdcFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcFood {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FdcNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdcNutrient {
    #[serde(default)]
    nutrient_name: Option<String>,
    #[serde(default)]
    unit_name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    amount: Option<f64>,
}

/// Pick the first nutrient present under any of `names`.
fn first_of(values: &HashMap<String, f64>, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| values.get(*name).copied())
        .unwrap_or(0.0)
}

/// Search results report nutrients per 100 g for the common data types.
fn profile_from_food(food: &FdcFood) -> NutrientProfile {
    let mut values: HashMap<String, f64> = HashMap::new();
    for nutrient in &food.food_nutrients {
        let Some(name) = nutrient.nutrient_name.as_deref() else {
            continue;
        };
        let name = name.to_lowercase();
        // Energy is reported in both kcal and kJ; keep only kcal.
        if name == "energy" && nutrient.unit_name.as_deref().is_some_and(|u| !u.eq_ignore_ascii_case("kcal")) {
            continue;
        }
        let value = nutrient.value.or(nutrient.amount).unwrap_or(0.0);
        values.entry(name).or_insert(value);
    }

    NutrientProfile {
        calories: first_of(&values, &["energy", "energy (kcal)", "calories"]),
        protein: first_of(&values, &["protein"]),
        carbs: first_of(
            &values,
            &["carbohydrate, by difference", "carbohydrate", "carbs"],
        ),
        fat: first_of(&values, &["total lipid (fat)", "fat"]),
        sugar: first_of(
            &values,
            &["sugars, total including nlea", "sugars, total", "sugar"],
        ),
        fiber: first_of(
            &values,
            &["fiber, total dietary", "dietary fiber", "fiber"],
        ),
        sodium: first_of(&values, &["sodium, na", "sodium"]),
    }
    .sanitized()
}

#[async_trait]
impl NutrientProvider for UsdaProvider {
    async fn lookup(&self, canonical_name: &str) -> Result<Option<NutrientProfile>, NutritionError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", canonical_name),
                ("pageSize", "1"),
            ])
            .send()
            .await
            .map_err(|e| NutritionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NutritionError::BadResponse {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| NutritionError::RequestFailed(e.to_string()))?;

        let Some(food) = body.foods.first() else {
            tracing::debug!(ingredient = %canonical_name, "no USDA match");
            return Ok(None);
        };
        tracing::debug!(
            ingredient = %canonical_name,
            matched = food.description.as_deref().unwrap_or("?"),
            "USDA match"
        );
        Ok(Some(profile_from_food(food)))
    }

    fn provider_name(&self) -> &'static str {
        "usda"
    }
}
