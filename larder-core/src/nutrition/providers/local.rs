//! Offline nutrient table embedded at compile time.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::nutrition::{NutrientProfile, NutrientProvider, NutritionError};

#[derive(Deserialize)]
struct NutrientTable {
    foods: HashMap<String, NutrientProfile>,
}

static FOODS: LazyLock<HashMap<String, NutrientProfile>> = LazyLock::new(|| {
    let json = include_str!("../../../data/nutrients.json");
    let table: NutrientTable =
        serde_json::from_str(json).expect("nutrients.json should be valid JSON");
    table
        .foods
        .into_iter()
        .map(|(name, profile)| (name.to_lowercase(), profile))
        .collect()
});

static CATEGORY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("valid regex"));

/// Fixed lookup table. Never touches the network, so it is the only provider
/// allowed in privacy mode.
#[derive(Debug, Clone, Default)]
pub struct LocalTableProvider;

impl LocalTableProvider {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous lookup: exact name, then without category tags, then singular.
    pub fn get(&self, canonical_name: &str) -> Option<NutrientProfile> {
        let key = canonical_name.trim().to_lowercase();
        let untagged = CATEGORY_TAG_RE.replace_all(&key, "").trim().to_string();
        let singular = untagged.strip_suffix('s').map(str::to_string);

        [Some(key), Some(untagged), singular]
            .into_iter()
            .flatten()
            .find_map(|candidate| FOODS.get(&candidate).copied())
    }

    pub fn len(&self) -> usize {
        FOODS.len()
    }

    pub fn is_empty(&self) -> bool {
        FOODS.is_empty()
    }
}

#[async_trait]
impl NutrientProvider for LocalTableProvider {
    async fn lookup(&self, canonical_name: &str) -> Result<Option<NutrientProfile>, NutritionError> {
        Ok(self.get(canonical_name))
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_foods() {
        let provider = LocalTableProvider::new();
        let peanut = provider.get("peanut").unwrap();
        assert_eq!(peanut.calories, 567.0);
        assert_eq!(peanut.fiber, 8.5);

        let soy = provider.get("  Soy Sauce ").unwrap();
        assert_eq!(soy.sodium, 56.3);

        assert_eq!(provider.get("wheat flour").unwrap().carbs, 76.3);
    }

    #[test]
    fn test_category_tag_and_plural() {
        let provider = LocalTableProvider::new();
        assert_eq!(provider.get("butter (dairy)").unwrap().calories, 717.0);
        assert_eq!(provider.get("eggs").unwrap().protein, 12.6);
    }

    #[test]
    fn test_unknown_food() {
        assert!(LocalTableProvider::new().get("dragon fruit jam").is_none());
    }

    #[test]
    fn test_table_is_non_negative() {
        let provider = LocalTableProvider::new();
        assert!(!provider.is_empty());
        for profile in FOODS.values() {
            assert_eq!(*profile, profile.sanitized());
        }
    }

    #[tokio::test]
    async fn test_async_lookup() {
        let provider = LocalTableProvider::new();
        let profile = provider.lookup("peanut butter").await.unwrap();
        assert_eq!(profile.map(|p| p.fat), Some(50.0));
    }
}
