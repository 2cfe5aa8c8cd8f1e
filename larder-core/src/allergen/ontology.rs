//! Static ingredient to allergen-category knowledge base.
//!
//! Data is loaded from `data/allergen_ontology.json` (plus regional synonym
//! overlays) at compile time and parsed once into a process-wide singleton.
//! The structure is immutable after construction.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergenCategory {
    pub id: String,
    pub labels: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OntologyData {
    #[serde(default)]
    version: Option<String>,
    categories: BTreeMap<String, AllergenCategory>,
    ingredient_map: BTreeMap<String, String>,
    /// Phrases containing an allergen word that are not themselves allergens
    /// ("coconut milk"). They are consumed during token matching.
    #[serde(default)]
    non_allergen_phrases: Vec<String>,
}

#[derive(Deserialize)]
struct RegionData {
    region: String,
    synonyms: BTreeMap<String, Vec<String>>,
}

/// A multi-word phrase matched against the token stream.
#[derive(Debug)]
struct Phrase {
    tokens: Vec<String>,
    category: Option<String>,
}

#[derive(Debug)]
pub struct AllergenOntology {
    version: Option<String>,
    categories: BTreeMap<String, AllergenCategory>,
    /// Normalized ingredient text -> category id.
    ingredient_map: HashMap<String, String>,
    /// Multi-word phrases, longest first.
    phrases: Vec<Phrase>,
    /// Label token -> category ids, in category order.
    label_index: HashMap<String, Vec<String>>,
    /// Region -> normalized synonym -> canonical terms.
    regions: HashMap<String, HashMap<String, Vec<String>>>,
}

static GLOBAL: LazyLock<AllergenOntology> = LazyLock::new(|| {
    AllergenOntology::from_json(
        include_str!("../../data/allergen_ontology.json"),
        &[include_str!("../../data/allergen_ontology_us.json")],
    )
    .expect("embedded allergen ontology should be valid JSON")
});

impl AllergenOntology {
    /// The embedded ontology, loaded on first use.
    pub fn global() -> &'static AllergenOntology {
        &GLOBAL
    }

    /// Build an ontology from a base table and any number of region overlays.
    pub fn from_json(base: &str, overlays: &[&str]) -> Result<Self, serde_json::Error> {
        let data: OntologyData = serde_json::from_str(base)?;

        let ingredient_map: HashMap<String, String> = data
            .ingredient_map
            .into_iter()
            .map(|(text, category)| (normalize_input(&text), category))
            .collect();

        let mut phrases: Vec<Phrase> = ingredient_map
            .iter()
            .map(|(text, category)| Phrase {
                tokens: tokenize(text),
                category: Some(category.clone()),
            })
            .chain(data.non_allergen_phrases.iter().map(|text| Phrase {
                tokens: tokenize(&normalize_input(text)),
                category: None,
            }))
            .filter(|phrase| phrase.tokens.len() > 1)
            .collect();
        phrases.sort_by(|a, b| {
            b.tokens
                .len()
                .cmp(&a.tokens.len())
                .then_with(|| a.tokens.cmp(&b.tokens))
        });

        let mut label_index: HashMap<String, Vec<String>> = HashMap::new();
        for (id, category) in &data.categories {
            for label in &category.labels {
                let ids = label_index.entry(normalize_input(label)).or_default();
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }

        let mut regions: HashMap<String, HashMap<String, Vec<String>>> = HashMap::new();
        for overlay in overlays {
            let region: RegionData = serde_json::from_str(overlay)?;
            let table = regions.entry(region.region.to_lowercase()).or_default();
            for (canonical, synonyms) in region.synonyms {
                for synonym in synonyms {
                    table
                        .entry(normalize_input(&synonym))
                        .or_default()
                        .push(canonical.clone());
                }
            }
        }

        Ok(Self {
            version: data.version,
            categories: data.categories,
            ingredient_map,
            phrases,
            label_index,
            regions,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn category(&self, id: &str) -> Option<&AllergenCategory> {
        self.categories.get(id)
    }

    /// Whether `region` (e.g. "us" or "en-US") has a synonym overlay.
    pub fn supports_region(&self, region: &str) -> bool {
        self.region_table(region).is_some()
    }

    /// All allergen categories for an ingredient, in order of discovery.
    ///
    /// Matches come from an exact lookup of the whole text, then a left to
    /// right token scan (longest known phrase first, then single tokens against
    /// the ingredient map and category labels), then the region's synonyms.
    pub fn allergens_for(&self, ingredient: &str, region: Option<&str>) -> Vec<String> {
        let normalized = normalize_input(ingredient);
        let mut found = Vec::new();
        if normalized.is_empty() {
            return found;
        }

        if let Some(category) = self.ingredient_map.get(&normalized) {
            push_unique(&mut found, category);
        }

        let tokens = tokenize(&normalized);
        let mut i = 0;
        while i < tokens.len() {
            if let Some(phrase) = self.phrase_at(&tokens[i..]) {
                if let Some(category) = &phrase.category {
                    push_unique(&mut found, category);
                }
                i += phrase.tokens.len();
                continue;
            }

            let token = &tokens[i];
            if let Some(category) = self.ingredient_map.get(token) {
                push_unique(&mut found, category);
            }
            if let Some(ids) = self.label_index.get(token) {
                for id in ids {
                    push_unique(&mut found, id);
                }
            }
            i += 1;
        }

        if let Some(table) = region.and_then(|region| self.region_table(region)) {
            for canonical in table.get(&normalized).into_iter().flatten() {
                for category in self.resolve_term(canonical) {
                    push_unique(&mut found, &category);
                }
            }
        }

        found
    }

    /// First discovered category, if any.
    pub fn primary_allergen(&self, ingredient: &str, region: Option<&str>) -> Option<String> {
        self.allergens_for(ingredient, region).into_iter().next()
    }

    pub fn is_allergen_in(&self, ingredient: &str, category: &str, region: Option<&str>) -> bool {
        self.allergens_for(ingredient, region)
            .iter()
            .any(|found| found == category)
    }

    /// Map a free-form allergen name ("tree nut", "Peanuts") to a category id.
    pub fn resolve_allergen_name(&self, name: &str) -> Option<String> {
        let normalized = normalize_input(name);
        let hyphenated = normalized.replace([' ', '_'], "-");
        if self.categories.contains_key(&hyphenated) {
            return Some(hyphenated);
        }
        self.resolve_term(&normalized).into_iter().next()
    }

    fn phrase_at(&self, tokens: &[String]) -> Option<&Phrase> {
        self.phrases
            .iter()
            .find(|phrase| tokens.starts_with(&phrase.tokens))
    }

    fn region_table(&self, region: &str) -> Option<&HashMap<String, Vec<String>>> {
        let region = region.trim().to_lowercase();
        self.regions.get(&region).or_else(|| {
            region
                .rsplit_once(['-', '_'])
                .and_then(|(_, country)| self.regions.get(country))
        })
    }

    /// Categories for a canonical term: ingredient map, then labels, then ids.
    fn resolve_term(&self, term: &str) -> Vec<String> {
        let term = normalize_input(term);
        if let Some(category) = self.ingredient_map.get(&term) {
            return vec![category.clone()];
        }
        if let Some(ids) = self.label_index.get(&term) {
            return ids.clone();
        }
        if self.categories.contains_key(&term) {
            return vec![term];
        }
        Vec::new()
    }
}

fn push_unique(found: &mut Vec<String>, category: &str) {
    if !found.iter().any(|existing| existing == category) {
        found.push(category.to_string());
    }
}

/// Trim, lowercase, unify dashes and collapse whitespace.
pub fn normalize_input(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
