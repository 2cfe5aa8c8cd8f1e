//! Conversion of parsed quantities to grams and milliliters.
//!
//! Weight units convert by fixed factor. Volume units go through milliliters
//! and a density lookup (caller overrides first, then the built-in heuristics
//! from `ingredient_density`). Anything that cannot be converted confidently
//! comes back flagged `uncertain` with a note; conversion never fails.

use std::collections::BTreeMap;

use ingredient_density::{builtin_density, volume_to_ml};
use serde::{Deserialize, Serialize};

use crate::ingredient_parser::{ParsedIngredient, Quantity, Unit};

/// Caller-supplied densities keyed by lowercase ingredient text.
///
/// For volume units the value is grams per milliliter and keys match exactly
/// or as a substring of the ingredient name. For countable units the value is
/// grams per item and only an exact key match counts.
pub type DensityOverrides = BTreeMap<String, f64>;

pub const NOTE_RANGE_AVERAGED: &str = "used average for range";
pub const NOTE_DENSITY_UNKNOWN: &str = "density unknown; returned milliliters only";
pub const NOTE_PIECE_WEIGHT_UNKNOWN: &str = "per-piece weight unknown; cannot convert to grams";
pub const NOTE_COUNTABLE_ITEM: &str = "countable item; per-piece weight unknown";
pub const NOTE_UNCONVERTIBLE: &str = "unable to convert; missing unit or density";

/// Words that mark a unit-less line as a count of items.
const COUNTABLE_WORDS: &[&str] = &["egg", "clove", "can", "package", "slice", "piece"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milliliters: Option<f64>,
    pub uncertain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ConversionResult {
    /// True when the result is exact enough to use without a caveat.
    pub fn is_confident(&self) -> bool {
        !self.uncertain && (self.grams.is_some() || self.milliliters.is_some())
    }

    fn unconvertible(note: &str) -> Self {
        Self {
            uncertain: true,
            note: Some(note.to_string()),
            ..Default::default()
        }
    }
}

/// Convert a parsed ingredient to grams (and milliliters for volume units).
pub fn convert(parsed: &ParsedIngredient, overrides: Option<&DensityOverrides>) -> ConversionResult {
    let name = parsed.ingredient_name.trim().to_lowercase();

    let (amount, averaged) = match &parsed.quantity {
        Some(Quantity::Amount(value)) => (*value, false),
        Some(range @ Quantity::Range(_)) => match range.range_bounds() {
            Some((low, high)) => ((low + high) / 2.0, true),
            None => return ConversionResult::unconvertible(NOTE_UNCONVERTIBLE),
        },
        None => return ConversionResult::unconvertible(NOTE_UNCONVERTIBLE),
    };
    if !amount.is_finite() || amount < 0.0 {
        return ConversionResult::unconvertible(NOTE_UNCONVERTIBLE);
    }

    let mut result = match parsed.unit {
        Some(Unit::G) => ConversionResult {
            grams: Some(amount.round()),
            ..Default::default()
        },
        Some(Unit::Kg) => ConversionResult {
            grams: Some((amount * 1000.0).round()),
            ..Default::default()
        },
        Some(unit) if unit.is_volume() => convert_volume(amount, unit, &name, overrides),
        Some(_) => match per_item_grams(&name, overrides) {
            Some(grams_each) => ConversionResult {
                grams: Some((amount * grams_each).round()),
                ..Default::default()
            },
            None => ConversionResult::unconvertible(NOTE_PIECE_WEIGHT_UNKNOWN),
        },
        None => match per_item_grams(&name, overrides) {
            Some(grams_each) if is_countable_name(&name) => ConversionResult {
                grams: Some((amount * grams_each).round()),
                ..Default::default()
            },
            _ if is_countable_name(&name) => ConversionResult::unconvertible(NOTE_COUNTABLE_ITEM),
            _ => ConversionResult::unconvertible(NOTE_UNCONVERTIBLE),
        },
    };

    if averaged {
        result.uncertain = true;
        result.note = Some(match result.note.take() {
            Some(note) => format!("{NOTE_RANGE_AVERAGED}; {note}"),
            None => NOTE_RANGE_AVERAGED.to_string(),
        });
    }

    result
}

fn convert_volume(
    amount: f64,
    unit: Unit,
    name: &str,
    overrides: Option<&DensityOverrides>,
) -> ConversionResult {
    let Some(ml) = volume_to_ml(amount, unit.as_str()) else {
        return ConversionResult::unconvertible(NOTE_UNCONVERTIBLE);
    };
    let milliliters = Some(round_to(ml, 3));

    match lookup_density(name, overrides) {
        Some(grams_per_ml) => ConversionResult {
            grams: Some((ml * grams_per_ml).round()),
            milliliters,
            ..Default::default()
        },
        None => ConversionResult {
            milliliters,
            uncertain: true,
            note: Some(NOTE_DENSITY_UNKNOWN.to_string()),
            ..Default::default()
        },
    }
}

/// Grams per milliliter: exact override, then the longest override key found
/// in the name, then the built-in heuristics.
fn lookup_density(name: &str, overrides: Option<&DensityOverrides>) -> Option<f64> {
    if let Some(overrides) = overrides {
        let usable = || {
            overrides
                .iter()
                .filter(|(_, value)| value.is_finite() && **value > 0.0)
                .map(|(key, value)| (key.trim().to_lowercase(), *value))
        };

        if let Some((_, value)) = usable().find(|(key, _)| key == name) {
            return Some(value);
        }

        let mut best: Option<(usize, f64)> = None;
        for (key, value) in usable() {
            if key.is_empty() || !name.contains(key.as_str()) {
                continue;
            }
            if best.map_or(true, |(len, _)| key.len() > len) {
                best = Some((key.len(), value));
            }
        }
        if let Some((_, value)) = best {
            return Some(value);
        }
    }
    builtin_density(name)
}

/// Per-item mass for countable units. Only an exact key match is accepted.
fn per_item_grams(name: &str, overrides: Option<&DensityOverrides>) -> Option<f64> {
    overrides?
        .iter()
        .find(|(key, value)| key.trim().to_lowercase() == name && value.is_finite() && **value > 0.0)
        .map(|(_, value)| *value)
}

fn is_countable_name(name: &str) -> bool {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            let singular = word.strip_suffix('s').unwrap_or(word);
            COUNTABLE_WORDS.contains(&word) || COUNTABLE_WORDS.contains(&singular)
        })
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_parser::parse_ingredient;

    fn parsed(quantity: f64, unit: Unit, name: &str) -> ParsedIngredient {
        ParsedIngredient {
            quantity: Some(Quantity::Amount(quantity)),
            unit: Some(unit),
            ingredient_name: name.to_string(),
        }
    }

    #[test]
    fn test_grams_pass_through() {
        for quantity in [0.0, 1.0, 85.0, 12.4, 12.6, 1000.0] {
            let result = convert(&parsed(quantity, Unit::G, "anything"), None);
            assert_eq!(result.grams, Some(quantity.round()));
            assert!(!result.uncertain);
        }
    }

    #[test]
    fn test_kilograms() {
        let result = convert(&parsed(1.5, Unit::Kg, "potatoes"), None);
        assert_eq!(result.grams, Some(1500.0));
        assert!(result.is_confident());
    }

    #[test]
    fn test_builtin_densities() {
        let cases = [
            (1.0, Unit::Cup, "water", 240.0),
            (1.0, Unit::Cup, "all-purpose flour", 127.0),
            (1.0, Unit::Cup, "granulated sugar", 204.0),
            (2.0, Unit::Tbsp, "butter", 28.0),
            (1.0, Unit::Cup, "white rice", 185.0),
            (1.0, Unit::Cup, "cooked rice", 158.0),
        ];
        for (quantity, unit, name, grams) in cases {
            let result = convert(&parsed(quantity, unit, name), None);
            assert_eq!(result.grams, Some(grams), "{quantity} {unit} {name}");
            assert!(!result.uncertain);
        }
    }

    #[test]
    fn test_milliliters_reported() {
        let result = convert(&parsed(1.0, Unit::Tsp, "water"), None);
        assert_eq!(result.milliliters, Some(4.929));
        assert_eq!(result.grams, Some(5.0));
    }

    #[test]
    fn test_unknown_density() {
        let result = convert(&parsed(1.0, Unit::Cup, "maple syrup"), None);
        assert!(result.uncertain);
        assert_eq!(result.grams, None);
        assert_eq!(result.milliliters, Some(240.0));
        assert_eq!(result.note.as_deref(), Some(NOTE_DENSITY_UNKNOWN));
    }

    #[test]
    fn test_override_exact_and_substring() {
        let mut overrides = DensityOverrides::new();
        overrides.insert("syrup".to_string(), 1.3);
        overrides.insert("maple syrup".to_string(), 1.37);

        let result = convert(&parsed(1.0, Unit::Cup, "maple syrup"), Some(&overrides));
        assert_eq!(result.grams, Some(329.0));

        let result = convert(&parsed(1.0, Unit::Cup, "golden syrup"), Some(&overrides));
        assert_eq!(result.grams, Some(312.0));
    }

    #[test]
    fn test_override_longest_substring_wins() {
        let mut overrides = DensityOverrides::new();
        overrides.insert("oil".to_string(), 0.5);
        overrides.insert("olive oil".to_string(), 0.91);

        let result = convert(&parsed(1.0, Unit::Cup, "extra virgin olive oil"), Some(&overrides));
        assert_eq!(result.grams, Some(218.0));
    }

    #[test]
    fn test_override_beats_builtin() {
        let mut overrides = DensityOverrides::new();
        overrides.insert("brown sugar".to_string(), 0.93);
        let result = convert(&parsed(1.0, Unit::Cup, "brown sugar"), Some(&overrides));
        assert_eq!(result.grams, Some(223.0));
    }

    #[test]
    fn test_range_is_averaged_and_uncertain() {
        let result = convert(&parse_ingredient("2-3 cups water"), None);
        assert_eq!(result.grams, Some(600.0));
        assert!(result.uncertain);
        assert_eq!(result.note.as_deref(), Some(NOTE_RANGE_AVERAGED));
    }

    #[test]
    fn test_countable_needs_exact_override() {
        let result = convert(&parse_ingredient("3 cloves garlic"), None);
        assert!(result.uncertain);
        assert_eq!(result.note.as_deref(), Some(NOTE_PIECE_WEIGHT_UNKNOWN));

        let mut overrides = DensityOverrides::new();
        overrides.insert("garlic".to_string(), 5.0);
        let result = convert(&parse_ingredient("3 cloves garlic"), Some(&overrides));
        assert_eq!(result.grams, Some(15.0));
        assert!(!result.uncertain);

        let result = convert(&parse_ingredient("3 cloves garlic, minced"), Some(&overrides));
        assert!(result.uncertain);
    }

    #[test]
    fn test_unitless_countable() {
        let result = convert(&parse_ingredient("3 large eggs"), None);
        assert!(result.uncertain);
        assert_eq!(result.note.as_deref(), Some(NOTE_COUNTABLE_ITEM));
    }

    #[test]
    fn test_missing_unit_or_quantity() {
        let result = convert(&parse_ingredient("2 bananas"), None);
        assert_eq!(result.note.as_deref(), Some(NOTE_UNCONVERTIBLE));

        let result = convert(&parse_ingredient("fresh basil"), None);
        assert!(result.uncertain);
        assert_eq!(result.grams, None);
        assert_eq!(result.milliliters, None);
    }

    #[test]
    fn test_confident_results_have_a_value() {
        let lines = [
            "1 cup water",
            "2-3 cups flour",
            "1 cup honey",
            "3 eggs",
            "2 slices bread",
            "500 g beef",
            "salt",
        ];
        for line in lines {
            let result = convert(&parse_ingredient(line), None);
            if !result.uncertain {
                assert!(result.grams.is_some() || result.milliliters.is_some(), "{line}");
            }
        }
    }
}
