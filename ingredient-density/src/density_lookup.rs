//! Built-in density heuristics.
//!
//! Densities are grams per milliliter. Rules are tried in declaration order and
//! the first keyword contained in the (lowercased) ingredient name wins, so
//! "peanut butter" resolves through the butter rule and "brown sugar" through
//! the sugar rule.

/// Volume conversion factors to milliliters.
pub const ML_PER_TSP: f64 = 4.92892;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_CUP: f64 = 240.0;
pub const ML_PER_L: f64 = 1000.0;

/// One substring-keyed density rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityRule {
    pub keyword: &'static str,
    pub grams_per_ml: f64,
    /// Alternate density used when the name says the ingredient is cooked.
    pub cooked_grams_per_ml: Option<f64>,
}

pub const BUILTIN_DENSITIES: &[DensityRule] = &[
    DensityRule {
        keyword: "water",
        grams_per_ml: 1.0,
        cooked_grams_per_ml: None,
    },
    // Granulated.
    DensityRule {
        keyword: "sugar",
        grams_per_ml: 0.85,
        cooked_grams_per_ml: None,
    },
    // All-purpose, scooped.
    DensityRule {
        keyword: "flour",
        grams_per_ml: 0.53,
        cooked_grams_per_ml: None,
    },
    DensityRule {
        keyword: "butter",
        grams_per_ml: 0.95,
        cooked_grams_per_ml: None,
    },
    DensityRule {
        keyword: "rice",
        grams_per_ml: 0.77,
        cooked_grams_per_ml: Some(0.66),
    },
];

/// Convert a volume amount to milliliters.
///
/// `unit` is one of the canonical volume codes: `tsp`, `tbsp`, `cup`, `ml`, `l`.
pub fn volume_to_ml(amount: f64, unit: &str) -> Option<f64> {
    match unit {
        "tsp" => Some(amount * ML_PER_TSP),
        "tbsp" => Some(amount * ML_PER_TBSP),
        "cup" => Some(amount * ML_PER_CUP),
        "ml" => Some(amount),
        "l" => Some(amount * ML_PER_L),
        _ => None,
    }
}

/// Find the built-in density (grams per milliliter) for an ingredient name.
pub fn builtin_density(ingredient_name: &str) -> Option<f64> {
    let name = ingredient_name.trim().to_lowercase();
    let rule = BUILTIN_DENSITIES
        .iter()
        .find(|rule| name.contains(rule.keyword))?;

    match rule.cooked_grams_per_ml {
        Some(cooked) if name.contains("cook") => Some(cooked),
        _ => Some(rule.grams_per_ml),
    }
}
