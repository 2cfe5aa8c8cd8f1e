//! Canonical ingredient names.
//!
//! Strips quantity, unit, brands and descriptive modifiers from an ingredient
//! line and appends a broad category tag ("butter (dairy)"). The canonical
//! name is the join key for allergen and nutrition lookups.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingredient_parser::parse_ingredient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIngredient {
    pub canonical_name: String,
    /// Self-contained rewrite request for a text-generation backend, for
    /// lines the heuristics handle poorly. Never sent from here.
    pub model_prompt: String,
}

const BRANDS: &[&str] = &[
    "amul",
    "kraft",
    "hellmann's",
    "hellmanns",
    "heinz",
    "bestfoods",
    "mccain",
];

/// Descriptive words dropped from names. Multi-word entries come first so they
/// win over their single-word tails.
const MODIFIERS: &[&str] = &[
    "room temperature",
    "extra large",
    "for garnish",
    "for serving",
    "to taste",
    "organic",
    "chopped",
    "minced",
    "grated",
    "large",
    "small",
    "medium",
    "jumbo",
    "optional",
    "peeled",
    "seeded",
    "softened",
    "melted",
    "drained",
    "rinsed",
    "slices",
    "slice",
    "fresh",
    "finely",
    "roughly",
    "coarsely",
    "thinly",
    "unsalted",
    "salted",
    "ripe",
    "crisp",
    "tender",
];

const DAIRY_WORDS: &[&str] = &[
    "butter",
    "buttermilk",
    "margarine",
    "ghee",
    "cheese",
    "cheddar",
    "parmesan",
    "mozzarella",
    "brie",
    "paneer",
    "cream",
    "milk",
    "yogurt",
    "yoghurt",
];

/// Phrases that contain a dairy word but are not dairy.
const NON_DAIRY_PHRASES: &[&str] = &[
    "peanut butter",
    "almond butter",
    "cashew butter",
    "nut butter",
    "cocoa butter",
    "apple butter",
    "shea butter",
    "almond milk",
    "soy milk",
    "oat milk",
    "rice milk",
    "cashew milk",
    "coconut milk",
    "coconut cream",
    "cream of tartar",
    "dairy-free",
    "dairy free",
    "non-dairy",
    "plant-based",
    "vegan",
];

const CONDIMENT_WORDS: &[&str] = &[
    "ketchup",
    "mustard",
    "mayonnaise",
    "mayo",
    "relish",
    "sauce",
    "salsa",
];

const PROMPT_EXAMPLES: &[(&str, &str)] = &[
    ("Amul butter", "butter (dairy)"),
    ("Kraft cheddar cheese", "cheddar cheese (dairy)"),
    ("Heinz tomato ketchup", "ketchup (condiment)"),
    ("organic brown rice", "brown rice"),
    ("unsalted butter", "butter (dairy)"),
    ("chopped fresh parsley", "parsley"),
];

static BRAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BRANDS
        .iter()
        .map(|brand| regex::escape(brand))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid regex")
});

static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = MODIFIERS
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid regex")
});

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s\-]").expect("valid regex"));

/// Broad category appended to a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryTag {
    Dairy,
    Condiment,
}

impl CategoryTag {
    fn label(self) -> &'static str {
        match self {
            CategoryTag::Dairy => "dairy",
            CategoryTag::Condiment => "condiment",
        }
    }

    fn for_name(name: &str) -> Option<Self> {
        let words: Vec<&str> = name.split_whitespace().collect();
        let has_word = |vocabulary: &[&str]| words.iter().any(|word| vocabulary.contains(word));

        if has_word(DAIRY_WORDS) && !NON_DAIRY_PHRASES.iter().any(|phrase| name.contains(phrase)) {
            Some(CategoryTag::Dairy)
        } else if has_word(CONDIMENT_WORDS) {
            Some(CategoryTag::Condiment)
        } else {
            None
        }
    }
}

/// Canonicalize an ingredient line.
pub fn canonicalize(line: &str) -> CanonicalIngredient {
    let parsed = parse_ingredient(line);
    let raw_name = if parsed.ingredient_name.is_empty() {
        line.trim().to_string()
    } else {
        parsed.ingredient_name
    };

    let stripped = strip_brands_and_modifiers(&raw_name);
    let canonical_name = match CategoryTag::for_name(&stripped) {
        Some(tag) => format!("{stripped} ({})", tag.label()),
        None => stripped,
    };

    CanonicalIngredient {
        canonical_name,
        model_prompt: build_model_prompt(line, &raw_name),
    }
}

fn strip_brands_and_modifiers(name: &str) -> String {
    let lower = name.to_lowercase().replace('’', "'");
    let text = PARENTHETICAL_RE.replace_all(&lower, " ");
    let text = BRAND_RE.replace_all(&text, " ");
    let text = MODIFIER_RE.replace_all(&text, " ");
    let text = PUNCTUATION_RE.replace_all(&text, " ");

    text.split_whitespace()
        .filter(|word| !word.chars().all(|c| c == '-'))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_model_prompt(line: &str, parsed_name: &str) -> String {
    let examples = PROMPT_EXAMPLES
        .iter()
        .map(|(input, output)| format!("- \"{input}\" => \"{output}\""))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a canonicalization assistant. Given an ingredient phrase, return a short \
         canonical ingredient name suitable for normalization and grouping. Remove brand names, \
         marketing words (organic), size/format hints (large, sliced), and preserve the food name. \
         Use tags for broad categories when helpful (example: \"butter (dairy)\"). Examples:\n\
         {examples}\n\n\
         Now canonicalize the original line: \"{line}\" (original) and the parsed name: \"{parsed_name}\" =>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        let cases = [
            ("2 cups Amul butter, softened", "butter (dairy)"),
            ("1 (400g) Heinz diced tomatoes", "diced tomatoes"),
            ("3 cloves garlic, minced", "garlic"),
            ("Kraft cheddar cheese slice", "cheddar cheese (dairy)"),
            ("organic brown rice", "brown rice"),
            (
                "Salt and freshly ground black pepper, to taste",
                "salt and freshly ground black pepper",
            ),
            ("2 tbsp Hellmann's mayonnaise", "mayonnaise (condiment)"),
            ("1 cup Heinz tomato ketchup", "tomato ketchup (condiment)"),
        ];
        for (line, expected) in cases {
            assert_eq!(canonicalize(line).canonical_name, expected, "{line}");
        }
    }

    #[test]
    fn test_non_dairy_compounds_are_not_tagged() {
        assert_eq!(canonicalize("2 tbsp peanut butter").canonical_name, "peanut butter");
        assert_eq!(canonicalize("1 cup almond milk").canonical_name, "almond milk");
        assert_eq!(canonicalize("1 butternut squash").canonical_name, "butternut squash");
        assert_eq!(canonicalize("1/4 tsp cream of tartar").canonical_name, "cream of tartar");
    }

    #[test]
    fn test_canonical_is_idempotent() {
        for line in [
            "2 cups Amul butter, softened",
            "Kraft cheddar cheese slice",
            "1 cup Heinz tomato ketchup",
            "organic brown rice",
            "1 cup almond milk",
        ] {
            let once = canonicalize(line).canonical_name;
            assert_eq!(canonicalize(&once).canonical_name, once, "{line}");
        }
    }

    #[test]
    fn test_modifier_inside_word_is_kept() {
        assert_eq!(canonicalize("smallage leaves").canonical_name, "smallage leaves");
    }

    #[test]
    fn test_model_prompt_embeds_line_and_examples() {
        let result = canonicalize("2 cups Amul butter, softened");
        assert!(result.model_prompt.contains("\"Amul butter\" => \"butter (dairy)\""));
        assert!(result.model_prompt.contains("\"2 cups Amul butter, softened\" (original)"));
        assert!(result
            .model_prompt
            .contains("parsed name: \"Amul butter, softened\""));
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(canonicalize("").canonical_name, "");
    }
}
